//! Browser extension packaging library.
//!
//! `extpack-core` turns an extension source tree into a store-ready zip:
//! it strips the development `key` from `manifest.json`, copies every file
//! not excluded by `.crxignore` rules into a clean staging directory, and
//! archives that directory as `{name}-{version}.zip` with stable entry
//! order and timestamps.
//!
//! # Examples
//!
//! ```no_run
//! use extpack_core::PackageConfig;
//! use extpack_core::package;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PackageConfig::for_project("/work/my-extension");
//! let report = package(&config)?;
//! println!(
//!     "Packaged {} files into {}",
//!     report.archive.entries_added,
//!     report.archive_path().display()
//! );
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
pub mod config;
pub mod copy;
pub mod error;
pub mod ignore;
pub mod manifest;
pub mod pipeline;
pub mod report;
pub mod stage;
pub mod walker;

pub use archive::ArchiveOptions;
pub use archive::archive_file_name;
pub use archive::make_zip;
pub use archive::make_zip_with_progress;
pub use archive::sanitize_name;
pub use config::PackageConfig;
pub use error::PackageError;
pub use error::Result;
pub use ignore::IgnoreRules;
pub use ignore::should_ignore;
pub use manifest::Manifest;
pub use manifest::load_manifest;
pub use pipeline::package;
pub use pipeline::package_with_progress;
pub use report::ArchiveReport;
pub use report::NoopProgress;
pub use report::PackageReport;
pub use report::ProgressCallback;
pub use report::StageReport;
pub use stage::stage_files;
pub use stage::stage_files_with_progress;

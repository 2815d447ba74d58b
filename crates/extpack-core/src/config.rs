//! Configuration for a packaging run.
//!
//! All locations are explicit. Nothing is derived from the current working
//! directory or the location of the running binary.

use crate::ArchiveOptions;
use crate::Result;
use crate::ignore::default_ignore_file;
use std::path::Path;
use std::path::PathBuf;

/// Source directory, relative to the project root, used by `for_project`.
pub const DEFAULT_SOURCE_DIR: &str = "src/app";

/// Output directory, relative to the project root, used by `for_project`.
pub const DEFAULT_OUTPUT_DIR: &str = "dist";

/// Staging directory name inside the output directory.
pub const DEFAULT_STAGING_DIR_NAME: &str = "pack";

/// Locations and options for one packaging run.
///
/// # Examples
///
/// ```
/// use extpack_core::PackageConfig;
/// use std::path::Path;
///
/// let config = PackageConfig::for_project("/work/notepad")
///     .with_source_dir("/work/notepad/extension")
///     .with_compression_level(9);
///
/// assert_eq!(config.output_dir, Path::new("/work/notepad/dist"));
/// assert_eq!(config.staging_dir, Path::new("/work/notepad/dist/pack"));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageConfig {
    /// Extension source tree; must contain `manifest.json`.
    pub source_dir: PathBuf,

    /// Ignore rules file. `None` means no rules.
    ///
    /// A path that does not exist is treated the same as `None`.
    pub ignore_file: Option<PathBuf>,

    /// Staging directory. Reset on every run.
    pub staging_dir: PathBuf,

    /// Directory receiving the archive.
    pub output_dir: PathBuf,

    /// Archive options.
    pub archive: ArchiveOptions,
}

impl PackageConfig {
    /// Creates a configuration from explicit locations, without ignore rules.
    pub fn new(
        source_dir: impl Into<PathBuf>,
        staging_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            ignore_file: None,
            staging_dir: staging_dir.into(),
            output_dir: output_dir.into(),
            archive: ArchiveOptions::default(),
        }
    }

    /// Conventional layout under a project root:
    ///
    /// - source: `<root>/src/app`
    /// - ignore rules: `<root>/.crxignore`
    /// - output: `<root>/dist`
    /// - staging: `<root>/dist/pack`
    pub fn for_project(project_root: impl AsRef<Path>) -> Self {
        let root = project_root.as_ref();
        let output_dir = root.join(DEFAULT_OUTPUT_DIR);
        Self {
            source_dir: root.join(DEFAULT_SOURCE_DIR),
            ignore_file: Some(default_ignore_file(root)),
            staging_dir: output_dir.join(DEFAULT_STAGING_DIR_NAME),
            output_dir,
            archive: ArchiveOptions::default(),
        }
    }

    /// Sets the source directory.
    #[must_use]
    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = dir.into();
        self
    }

    /// Sets the ignore rules file.
    #[must_use]
    pub fn with_ignore_file(mut self, file: Option<PathBuf>) -> Self {
        self.ignore_file = file;
        self
    }

    /// Sets the staging directory.
    #[must_use]
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    /// Sets the output directory.
    ///
    /// The staging directory is left where it is.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the deflate level (1-9).
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        self.archive = self.archive.with_compression_level(level);
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the compression level is not in 1-9.
    pub fn validate(&self) -> Result<()> {
        self.archive.validate()
    }
}

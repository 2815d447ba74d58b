//! Packaging operation reporting.

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

/// Report of a staging pass.
#[derive(Debug, Clone, Default)]
pub struct StageReport {
    /// Number of source files copied into staging (the manifest excluded).
    pub files_staged: usize,

    /// Number of source files skipped by ignore rules.
    pub files_ignored: usize,

    /// Total bytes copied into staging, manifest included.
    pub bytes_staged: u64,

    /// Relative paths of ignored files, in walk order.
    pub ignored_paths: Vec<PathBuf>,

    /// Duration of the staging pass.
    pub duration: Duration,
}

impl StageReport {
    /// Creates a new empty staging report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a file skipped by an ignore rule.
    pub fn record_ignored(&mut self, relative: impl Into<PathBuf>) {
        self.files_ignored += 1;
        self.ignored_paths.push(relative.into());
    }
}

/// Report of an archive build.
///
/// # Examples
///
/// ```
/// use extpack_core::ArchiveReport;
///
/// let mut report = ArchiveReport::default();
/// report.bytes_written = 1000;
/// report.bytes_compressed = 250;
///
/// assert_eq!(report.compression_ratio(), 4.0);
/// assert_eq!(report.compression_percentage(), 75.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArchiveReport {
    /// Final archive location.
    pub archive_path: PathBuf,

    /// Number of file entries in the archive.
    pub entries_added: usize,

    /// Total uncompressed bytes added.
    pub bytes_written: u64,

    /// Size of the finished archive file.
    pub bytes_compressed: u64,

    /// Duration of the archive build.
    pub duration: Duration,
}

impl ArchiveReport {
    /// Returns the file name of the archive, if it has one.
    #[must_use]
    pub fn archive_name(&self) -> Option<&str> {
        self.archive_path.file_name().and_then(|name| name.to_str())
    }

    /// Returns the compression ratio (uncompressed / compressed).
    ///
    /// Returns 0.0 if either side is 0.
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_compressed == 0 || self.bytes_written == 0 {
            return 0.0;
        }
        self.bytes_written as f64 / self.bytes_compressed as f64
    }

    /// Returns the compression percentage (space saved).
    ///
    /// Returns 0.0 if nothing was written. An archive can be larger than its
    /// contents (headers on tiny files), in which case this is also 0.0.
    #[must_use]
    pub fn compression_percentage(&self) -> f64 {
        if self.bytes_written == 0 {
            return 0.0;
        }
        let saved = self.bytes_written.saturating_sub(self.bytes_compressed);
        (saved as f64 / self.bytes_written as f64) * 100.0
    }

    /// Archive size in mebibytes.
    #[must_use]
    pub fn size_mib(&self) -> f64 {
        self.bytes_compressed as f64 / (1024.0 * 1024.0)
    }
}

/// Report of a full packaging run.
#[derive(Debug, Clone, Default)]
pub struct PackageReport {
    /// Manifest `name` as read from the source.
    pub name: String,

    /// Version used in the archive name.
    pub version: String,

    /// Whether a `key` field was removed from the manifest.
    pub key_stripped: bool,

    /// Number of ignore patterns in effect.
    pub ignore_patterns: usize,

    /// Staging results.
    pub stage: StageReport,

    /// Archive results.
    pub archive: ArchiveReport,
}

impl PackageReport {
    /// Final archive location.
    #[must_use]
    pub fn archive_path(&self) -> &Path {
        &self.archive.archive_path
    }

    /// Total wall time of staging and archiving.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.stage.duration + self.archive.duration
    }
}

/// Callback trait for progress reporting during staging and archiving.
///
/// The trait requires `Send` so callers can hand a progress sink to another
/// thread if they choose to.
///
/// # Examples
///
/// ```
/// use extpack_core::ProgressCallback;
/// use std::path::Path;
///
/// struct SimpleProgress;
///
/// impl ProgressCallback for SimpleProgress {
///     fn on_entry_start(&mut self, path: &Path, total: usize, current: usize) {
///         println!("[{current}/{total}] {}", path.display());
///     }
///
///     fn on_bytes_written(&mut self, _bytes: u64) {}
///
///     fn on_entry_complete(&mut self, _path: &Path) {}
///
///     fn on_complete(&mut self) {
///         println!("done");
///     }
/// }
/// ```
pub trait ProgressCallback: Send {
    /// Called before an entry is copied or archived.
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the entry, relative to its root
    /// * `total` - Total number of entries in this phase
    /// * `current` - Current entry number (1-indexed)
    fn on_entry_start(&mut self, path: &Path, total: usize, current: usize);

    /// Called as bytes are copied into staging or the archive.
    fn on_bytes_written(&mut self, bytes: u64);

    /// Called when an entry has been fully processed.
    fn on_entry_complete(&mut self, path: &Path);

    /// Called once when the phase finishes.
    fn on_complete(&mut self);
}

/// No-op implementation of `ProgressCallback`.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _path: &Path, _total: usize, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _path: &Path) {}

    fn on_complete(&mut self) {}
}

//! Deterministic zip construction from a staged tree.
//!
//! Archives are reproducible: entries are added in sorted order, every entry
//! carries the DOS epoch timestamp (1980-01-01 00:00:00), and the archive is
//! named purely from manifest fields. Two runs over identical staged trees
//! produce byte-identical files.

use crate::ArchiveReport;
use crate::Manifest;
use crate::NoopProgress;
use crate::PackageError;
use crate::ProgressCallback;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::CopyError;
use crate::copy::copy_with_buffer;
use crate::walker::collect_files;
use crate::walker::to_posix_string;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;
use tracing::info;
use zip::CompressionMethod;
use zip::DateTime;
use zip::ZipWriter;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;

/// File extension of produced archives.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Default deflate level.
pub const DEFAULT_COMPRESSION_LEVEL: u8 = 6;

/// Options for archive construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveOptions {
    /// Deflate level, 1 (fastest) to 9 (smallest).
    pub compression_level: u8,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl ArchiveOptions {
    /// Sets the compression level.
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        self.compression_level = level;
        self
    }

    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::InvalidCompressionLevel`] if the level is not
    /// in 1-9.
    pub fn validate(&self) -> Result<()> {
        if !(1..=9).contains(&self.compression_level) {
            return Err(PackageError::InvalidCompressionLevel {
                level: self.compression_level,
            });
        }
        Ok(())
    }

    fn file_options(self) -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(i64::from(self.compression_level)))
            .last_modified_time(DateTime::default())
    }
}

/// Reduces a manifest name to a file-name-safe base.
///
/// Keeps alphanumeric characters (Unicode-aware), `-`, `_` and `.`; drops
/// everything else, spaces included.
///
/// # Examples
///
/// ```
/// use extpack_core::archive::sanitize_name;
///
/// assert_eq!(sanitize_name("My Ext!"), "MyExt");
/// assert_eq!(sanitize_name("tab_switcher-2.0 (beta)"), "tab_switcher-2.0beta");
/// assert_eq!(sanitize_name("Café Ü"), "CaféÜ");
/// ```
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ' '))
        .filter(|c| *c != ' ')
        .collect()
}

/// Computes `{sanitized_name}-{version}.zip` for a manifest.
///
/// # Examples
///
/// ```
/// use extpack_core::Manifest;
/// use extpack_core::archive_file_name;
///
/// let manifest = Manifest::parse(r#"{"name": "My Ext!", "version": "1.2.0"}"#)?;
/// assert_eq!(archive_file_name(&manifest), "MyExt-1.2.0.zip");
///
/// let manifest = Manifest::parse(r#"{"name": "My Ext!"}"#)?;
/// assert_eq!(archive_file_name(&manifest), "MyExt-0.0.0.zip");
/// # Ok::<(), serde_json::Error>(())
/// ```
#[must_use]
pub fn archive_file_name(manifest: &Manifest) -> String {
    format!(
        "{}-{}.{ARCHIVE_EXTENSION}",
        sanitize_name(manifest.name()),
        manifest.archive_version()
    )
}

/// Builds the archive for `manifest` from every file under `staging_root`.
///
/// The archive lands in `output_dir` (created if missing) and silently
/// replaces an existing archive of the same name. It is written to a
/// temporary file first and renamed into place only on success.
///
/// # Errors
///
/// - [`PackageError::InvalidCompressionLevel`] for bad options
/// - [`PackageError::Io`] for filesystem failures
/// - [`PackageError::ArchiveWrite`] if the zip writer fails
///
/// # Examples
///
/// ```no_run
/// use extpack_core::ArchiveOptions;
/// use extpack_core::load_manifest;
/// use extpack_core::make_zip;
/// use std::path::Path;
///
/// let manifest = load_manifest(Path::new("src/app"))?;
/// let report = make_zip(
///     &manifest,
///     Path::new("dist/pack"),
///     Path::new("dist"),
///     ArchiveOptions::default(),
/// )?;
/// println!("{} ({:.2} MB)", report.archive_path.display(), report.size_mib());
/// # Ok::<(), extpack_core::PackageError>(())
/// ```
pub fn make_zip(
    manifest: &Manifest,
    staging_root: &Path,
    output_dir: &Path,
    options: ArchiveOptions,
) -> Result<ArchiveReport> {
    make_zip_with_progress(manifest, staging_root, output_dir, options, &mut NoopProgress)
}

/// Same as [`make_zip`], reporting each entry to `progress`.
pub fn make_zip_with_progress(
    manifest: &Manifest,
    staging_root: &Path,
    output_dir: &Path,
    options: ArchiveOptions,
    progress: &mut dyn ProgressCallback,
) -> Result<ArchiveReport> {
    options.validate()?;
    let start = Instant::now();

    std::fs::create_dir_all(output_dir).map_err(|e| PackageError::io(output_dir, e))?;
    let target = archive_path(manifest, output_dir);

    let entries = collect_files(staging_root)?;

    let temp = tempfile::Builder::new()
        .prefix(".extpack-")
        .suffix(".zip.partial")
        .tempfile_in(output_dir)
        .map_err(|e| PackageError::io(output_dir, e))?;

    let mut report = ArchiveReport {
        archive_path: target.clone(),
        ..ArchiveReport::default()
    };

    let mut zip = ZipWriter::new(temp);
    let base_options = options.file_options();
    let total = entries.len();
    let mut buffer = CopyBuffer::new();

    for (idx, entry) in entries.iter().enumerate() {
        progress.on_entry_start(&entry.relative, total, idx + 1);

        let name = to_posix_string(&entry.relative).ok_or_else(|| {
            PackageError::io(
                &entry.path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, "path is not valid UTF-8"),
            )
        })?;

        let mut file = File::open(&entry.path).map_err(|e| PackageError::io(&entry.path, e))?;
        let file_options = entry_options(base_options, &file, &entry.path)?;

        zip.start_file(name.as_str(), file_options)
            .map_err(|source| archive_error(&target, source))?;
        let written = copy_with_buffer(&mut file, &mut zip, &mut buffer, progress)
            .map_err(|e| match e {
                CopyError::Read(e) => PackageError::io(&entry.path, e),
                CopyError::Write(e) => archive_error(&target, ZipError::Io(e)),
            })?;

        debug!(entry = %name, bytes = written, "archived");
        report.entries_added += 1;
        report.bytes_written += written;

        progress.on_entry_complete(&entry.relative);
    }

    let mut temp = zip
        .finish()
        .map_err(|source| archive_error(&target, source))?;
    temp.flush()
        .map_err(|e| PackageError::io(temp.path(), e))?;
    report.bytes_compressed = temp
        .as_file()
        .metadata()
        .map_err(|e| PackageError::io(temp.path(), e))?
        .len();
    publish_permissions(temp.path())?;

    temp.persist(&target)
        .map_err(|e| PackageError::io(&target, e.error))?;
    progress.on_complete();

    report.duration = start.elapsed();
    info!(
        archive = %target.display(),
        entries = report.entries_added,
        size_mb = format_args!("{:.2}", report.size_mib()),
        "archive created"
    );

    Ok(report)
}

/// Final archive path for `manifest` inside `output_dir`.
#[must_use]
pub fn archive_path(manifest: &Manifest, output_dir: &Path) -> PathBuf {
    output_dir.join(archive_file_name(manifest))
}

#[cfg(unix)]
fn entry_options(base: SimpleFileOptions, file: &File, path: &Path) -> Result<SimpleFileOptions> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = file.metadata().map_err(|e| PackageError::io(path, e))?;
    Ok(base.unix_permissions(metadata.permissions().mode()))
}

#[cfg(not(unix))]
fn entry_options(base: SimpleFileOptions, _file: &File, _path: &Path) -> Result<SimpleFileOptions> {
    Ok(base)
}

/// Temp files are created owner-only; the published archive is not.
#[cfg(unix)]
fn publish_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o644))
        .map_err(|e| PackageError::io(path, e))
}

#[cfg(not(unix))]
fn publish_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

fn archive_error(path: &Path, source: ZipError) -> PackageError {
    PackageError::ArchiveWrite {
        path: path.to_path_buf(),
        source,
    }
}

//! Staging: building the exact tree that will be archived.
//!
//! The staging directory is owned by a single packaging run. It is removed
//! and recreated on every call, so nothing from a previous run can leak into
//! a new archive. Running two packagers against the same staging directory
//! at once is unsupported and unguarded.

use crate::IgnoreRules;
use crate::Manifest;
use crate::NoopProgress;
use crate::PackageError;
use crate::ProgressCallback;
use crate::Result;
use crate::StageReport;
use crate::copy::CopyBuffer;
use crate::copy::copy_file_preserving;
use crate::manifest::MANIFEST_FILE_NAME;
use crate::walker::collect_files;
use std::path::Path;
use std::time::Instant;
use tracing::debug;
use tracing::info;

/// Stages the non-ignored files of `source_root` into `staging_root` and
/// writes the sanitized manifest.
///
/// After this call `staging_root` contains exactly the source files that no
/// rule ignores, plus one `manifest.json` rendered from `manifest`. A
/// `manifest.json` in the source is never copied; the in-memory manifest
/// always replaces it.
///
/// # Errors
///
/// Any filesystem failure (reset, walk, copy, manifest write) is returned as
/// [`PackageError::Io`] naming the path involved.
///
/// # Examples
///
/// ```no_run
/// use extpack_core::IgnoreRules;
/// use extpack_core::load_manifest;
/// use extpack_core::stage_files;
/// use std::path::Path;
///
/// let source = Path::new("src/app");
/// let manifest = load_manifest(source)?;
/// let rules = IgnoreRules::load(Path::new(".crxignore"))?;
/// let report = stage_files(&manifest, &rules, source, Path::new("dist/pack"))?;
/// println!("staged {} files", report.files_staged);
/// # Ok::<(), extpack_core::PackageError>(())
/// ```
pub fn stage_files(
    manifest: &Manifest,
    rules: &IgnoreRules,
    source_root: &Path,
    staging_root: &Path,
) -> Result<StageReport> {
    stage_files_with_progress(manifest, rules, source_root, staging_root, &mut NoopProgress)
}

/// Same as [`stage_files`], reporting each copied file to `progress`.
pub fn stage_files_with_progress(
    manifest: &Manifest,
    rules: &IgnoreRules,
    source_root: &Path,
    staging_root: &Path,
    progress: &mut dyn ProgressCallback,
) -> Result<StageReport> {
    let start = Instant::now();
    let mut report = StageReport::new();

    reset_dir(staging_root)?;

    // Collected after the reset and before any copy, so a staging directory
    // nested under the source is seen empty and never re-staged.
    let entries = collect_files(source_root)?;

    let mut included = Vec::with_capacity(entries.len());
    for entry in entries {
        if rules.is_ignored(&entry.relative) {
            debug!(path = %entry.relative.display(), "ignored");
            report.record_ignored(entry.relative);
        } else if entry.relative == Path::new(MANIFEST_FILE_NAME) {
            // Written from the sanitized manifest below.
        } else {
            included.push(entry);
        }
    }

    let total = included.len();
    let mut buffer = CopyBuffer::new();
    for (idx, entry) in included.iter().enumerate() {
        progress.on_entry_start(&entry.relative, total, idx + 1);

        let dest = staging_root.join(&entry.relative);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PackageError::io(parent, e))?;
        }
        report.bytes_staged += copy_file_preserving(&entry.path, &dest, &mut buffer, progress)?;
        report.files_staged += 1;

        progress.on_entry_complete(&entry.relative);
    }

    report.bytes_staged += write_manifest(manifest, staging_root)?;
    progress.on_complete();

    report.duration = start.elapsed();
    info!(
        staged = report.files_staged,
        ignored = report.files_ignored,
        bytes = report.bytes_staged,
        staging = %staging_root.display(),
        "staging complete"
    );

    Ok(report)
}

/// Removes `dir` if present and recreates it empty.
pub fn reset_dir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(PackageError::io(dir, e)),
    }
    std::fs::create_dir_all(dir).map_err(|e| PackageError::io(dir, e))
}

/// Writes the sanitized manifest into `staging_root`, replacing any file
/// already there. Returns the number of bytes written.
fn write_manifest(manifest: &Manifest, staging_root: &Path) -> Result<u64> {
    let path = staging_root.join(MANIFEST_FILE_NAME);
    let json = manifest
        .to_pretty_json()
        .map_err(|e| PackageError::io(&path, std::io::Error::other(e)))?;
    std::fs::write(&path, &json).map_err(|e| PackageError::io(&path, e))?;
    Ok(json.len() as u64)
}

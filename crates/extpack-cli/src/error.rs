//! Error conversion utilities for CLI.
//!
//! Converts extpack-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance, and maps them to
//! process exit codes.

use extpack_core::PackageError;
use std::path::Path;

/// Exit code for a missing or unparseable manifest.
pub const EXIT_MANIFEST: u8 = 1;

/// Exit code for filesystem, rules, and archive failures.
pub const EXIT_FAILURE: u8 = 2;

/// Converts `PackageError` to user-friendly anyhow error with context
pub fn convert_package_error(err: PackageError) -> anyhow::Error {
    match &err {
        PackageError::ManifestNotFound { path } => {
            let message = format!(
                "No manifest.json in '{}'\n\
                 HINT: Point --source (or EXT_DIR) at the extension directory.",
                parent_display(path)
            );
            anyhow::Error::from(err).context(message)
        }
        PackageError::ManifestParse { path, .. } => {
            let message = format!(
                "Manifest '{}' is not a valid extension manifest\n\
                 HINT: manifest.json must be a JSON object with a string \"name\".",
                path.display()
            );
            anyhow::Error::from(err).context(message)
        }
        PackageError::InvalidPattern { line, .. } => {
            let message = format!(
                "Invalid ignore rule on line {line}\n\
                 HINT: The rule is too large to compile; split it into shorter rules."
            );
            anyhow::Error::from(err).context(message)
        }
        PackageError::InvalidCompressionLevel { .. } => {
            anyhow::Error::from(err).context("HINT: Use a compression level from 1 to 9.")
        }
        PackageError::ArchiveWrite { path, .. } => {
            let message = format!(
                "Failed to write archive '{}'\n\
                 HINT: Check free space and permissions on the output directory.",
                path.display()
            );
            anyhow::Error::from(err).context(message)
        }
        _ => anyhow::Error::from(err).context("Packaging failed"),
    }
}

/// Adds context to a result from the packaging library
pub fn add_package_context<T>(result: Result<T, PackageError>) -> anyhow::Result<T> {
    result.map_err(convert_package_error)
}

/// Picks the process exit code for a failed command.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    let manifest_error = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<PackageError>())
        .any(PackageError::is_manifest_error);

    if manifest_error {
        EXIT_MANIFEST
    } else {
        EXIT_FAILURE
    }
}

fn parent_display(path: &Path) -> String {
    path.parent().unwrap_or(path).display().to_string()
}

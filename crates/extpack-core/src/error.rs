//! Error types for extension packaging operations.

use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `PackageError`.
pub type Result<T> = std::result::Result<T, PackageError>;

/// Errors that can occur while packaging an extension.
///
/// Every variant carries the path (or pattern) that caused the failure. None
/// of them are recovered internally: a failed run is re-invoked from the top.
#[derive(Error, Debug)]
pub enum PackageError {
    /// The manifest document does not exist under the source root.
    #[error("manifest not found: {path}")]
    ManifestNotFound {
        /// Expected manifest location.
        path: PathBuf,
    },

    /// The manifest document is not a valid manifest object.
    #[error("failed to parse manifest {path}: {source}")]
    ManifestParse {
        /// Manifest location.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// An ignore rule could not be compiled.
    #[error("invalid ignore pattern '{pattern}' on line {line}: {source}")]
    InvalidPattern {
        /// The offending pattern text.
        pattern: String,
        /// 1-based line number in the rules file.
        line: usize,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// A path handed to the pattern matcher lies outside the source root.
    #[error("path {path} is not under source root {root}")]
    PathOutsideRoot {
        /// The path being matched.
        path: PathBuf,
        /// The source root it was expected under.
        root: PathBuf,
    },

    /// Filesystem operation failed (copy, delete, mkdir, walk, read).
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path the operation was acting on.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The zip writer failed while building the archive.
    #[error("failed to write archive {path}: {source}")]
    ArchiveWrite {
        /// Archive being written.
        path: PathBuf,
        /// Underlying zip error.
        #[source]
        source: zip::result::ZipError,
    },

    /// Compression level outside 1-9.
    #[error("invalid compression level {level}, expected 1-9")]
    InvalidCompressionLevel {
        /// The rejected level.
        level: u8,
    },
}

impl PackageError {
    /// Builds an `Io` error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if this error comes from loading the manifest.
    ///
    /// # Examples
    ///
    /// ```
    /// use extpack_core::PackageError;
    /// use std::path::PathBuf;
    ///
    /// let err = PackageError::ManifestNotFound {
    ///     path: PathBuf::from("src/app/manifest.json"),
    /// };
    /// assert!(err.is_manifest_error());
    ///
    /// let err = PackageError::InvalidCompressionLevel { level: 12 };
    /// assert!(!err.is_manifest_error());
    /// ```
    #[must_use]
    pub const fn is_manifest_error(&self) -> bool {
        matches!(self, Self::ManifestNotFound { .. } | Self::ManifestParse { .. })
    }

    /// Returns the path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::ManifestNotFound { path }
            | Self::ManifestParse { path, .. }
            | Self::PathOutsideRoot { path, .. }
            | Self::Io { path, .. }
            | Self::ArchiveWrite { path, .. } => Some(path),
            Self::InvalidPattern { .. } | Self::InvalidCompressionLevel { .. } => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_manifest_not_found_display() {
        let err = PackageError::ManifestNotFound {
            path: PathBuf::from("src/app/manifest.json"),
        };
        assert_eq!(
            err.to_string(),
            "manifest not found: src/app/manifest.json"
        );
        assert!(err.is_manifest_error());
    }

    #[test]
    fn test_manifest_parse_keeps_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = PackageError::ManifestParse {
            path: PathBuf::from("manifest.json"),
            source: json_err,
        };
        assert!(err.to_string().contains("manifest.json"));
        assert!(err.source().is_some());
        assert!(err.is_manifest_error());
    }

    #[test]
    fn test_io_error_names_path() {
        let err = PackageError::io(
            "dist/pack/a.txt",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let display = err.to_string();
        assert!(display.contains("dist/pack/a.txt"));
        assert!(display.contains("denied"));
        assert!(!err.is_manifest_error());
        assert_eq!(err.path(), Some(Path::new("dist/pack/a.txt")));
    }

    #[test]
    fn test_invalid_pattern_display() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = PackageError::InvalidPattern {
            pattern: "[abc".to_string(),
            line: 3,
            source,
        };
        let display = err.to_string();
        assert!(display.contains("[abc"));
        assert!(display.contains("line 3"));
        assert_eq!(err.path(), None);
    }

    #[test]
    fn test_path_outside_root_display() {
        let err = PackageError::PathOutsideRoot {
            path: PathBuf::from("/elsewhere/file.js"),
            root: PathBuf::from("/project/src/app"),
        };
        let display = err.to_string();
        assert!(display.contains("/elsewhere/file.js"));
        assert!(display.contains("/project/src/app"));
    }

    #[test]
    fn test_invalid_compression_level_display() {
        let err = PackageError::InvalidCompressionLevel { level: 0 };
        assert_eq!(err.to_string(), "invalid compression level 0, expected 1-9");
    }
}

//! Directory tree walking.
//!
//! Both the stager and the archiver need the same view of a tree: every
//! regular file below a root, with its root-relative path, in a stable order.

use crate::PackageError;
use crate::Result;
use crate::ignore::relative_path;
use std::path::Path;
use std::path::PathBuf;
use walkdir::WalkDir;

/// A regular file found under a root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Full filesystem path.
    pub path: PathBuf,

    /// Path relative to the walked root.
    pub relative: PathBuf,
}

/// Collects every regular file under `root`, sorted by file name within each
/// directory.
///
/// Symlinks to files count as files; symlinked directories are not entered.
/// Directories themselves are never returned.
///
/// # Errors
///
/// Returns [`PackageError::Io`] naming the failing path if the root is
/// missing or any directory cannot be read.
///
/// # Examples
///
/// ```no_run
/// use extpack_core::walker::collect_files;
/// use std::path::Path;
///
/// for entry in collect_files(Path::new("src/app"))? {
///     println!("{}", entry.relative.display());
/// }
/// # Ok::<(), extpack_core::PackageError>(())
/// ```
pub fn collect_files(root: &Path) -> Result<Vec<FileEntry>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
            PackageError::io(path, std::io::Error::from(e))
        })?;

        let is_file = if entry.path_is_symlink() {
            entry.path().is_file()
        } else {
            entry.file_type().is_file()
        };
        if !is_file {
            continue;
        }

        let relative = relative_path(entry.path(), root)?.to_path_buf();
        files.push(FileEntry {
            path: entry.into_path(),
            relative,
        });
    }

    Ok(files)
}

/// Renders a relative path with `/` separators, as used for ignore matching
/// and zip entry names. Returns `None` if any component is not UTF-8.
///
/// # Examples
///
/// ```
/// use extpack_core::walker::to_posix_string;
/// use std::path::PathBuf;
///
/// let path: PathBuf = ["js", "lib", "app.js"].iter().collect();
/// assert_eq!(to_posix_string(&path).as_deref(), Some("js/lib/app.js"));
/// ```
#[must_use]
pub fn to_posix_string(relative: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        parts.push(component.as_os_str().to_str()?);
    }
    Some(parts.join("/"))
}

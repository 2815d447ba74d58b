//! File copying with a reusable buffer and metadata preservation.

use crate::PackageError;
use crate::ProgressCallback;
use crate::Result;
use filetime::FileTime;
use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::io::{self};
use std::path::Path;

/// Buffer size for copy operations (64KB).
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Stack-allocated buffer reused across every file of a staging or archive
/// pass.
#[derive(Debug)]
pub struct CopyBuffer {
    #[allow(clippy::large_stack_arrays)]
    buf: [u8; COPY_BUFFER_SIZE],
}

impl CopyBuffer {
    /// Creates a new zeroed copy buffer.
    #[inline]
    #[must_use]
    #[allow(clippy::large_stack_arrays)]
    pub fn new() -> Self {
        Self {
            buf: [0u8; COPY_BUFFER_SIZE],
        }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        COPY_BUFFER_SIZE
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Which side of a copy failed.
#[derive(Debug)]
pub enum CopyError {
    /// Reading from the source failed.
    Read(io::Error),
    /// Writing to the destination failed.
    Write(io::Error),
}

impl CopyError {
    /// Attaches the path of the failing side.
    pub fn with_paths(self, source: &Path, dest: &Path) -> PackageError {
        match self {
            Self::Read(e) => PackageError::io(source, e),
            Self::Write(e) => PackageError::io(dest, e),
        }
    }
}

/// Copies `reader` into `writer` through `buffer`, reporting each chunk to
/// `progress`. Returns the number of bytes copied.
///
/// # Examples
///
/// ```
/// use extpack_core::NoopProgress;
/// use extpack_core::copy::CopyBuffer;
/// use extpack_core::copy::copy_with_buffer;
/// use std::io::Cursor;
///
/// let mut buffer = CopyBuffer::new();
/// let mut output = Vec::new();
/// let copied = copy_with_buffer(
///     &mut Cursor::new(b"hello"),
///     &mut output,
///     &mut buffer,
///     &mut NoopProgress,
/// )
/// .unwrap();
/// assert_eq!(copied, 5);
/// assert_eq!(output, b"hello");
/// ```
pub fn copy_with_buffer<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
    progress: &mut dyn ProgressCallback,
) -> std::result::Result<u64, CopyError> {
    let mut total: u64 = 0;

    loop {
        let bytes_read = match reader.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };

        writer
            .write_all(&buffer.buf[..bytes_read])
            .map_err(CopyError::Write)?;

        total += bytes_read as u64;
        progress.on_bytes_written(bytes_read as u64);
    }

    Ok(total)
}

/// Copies `source` to `dest`, then carries over permissions and
/// access/modification times.
///
/// `dest` is truncated if it exists. Its parent directory must exist.
pub fn copy_file_preserving(
    source: &Path,
    dest: &Path,
    buffer: &mut CopyBuffer,
    progress: &mut dyn ProgressCallback,
) -> Result<u64> {
    let mut input = File::open(source).map_err(|e| PackageError::io(source, e))?;
    let metadata = input.metadata().map_err(|e| PackageError::io(source, e))?;
    let mut output = File::create(dest).map_err(|e| PackageError::io(dest, e))?;

    let copied = copy_with_buffer(&mut input, &mut output, buffer, progress)
        .map_err(|e| e.with_paths(source, dest))?;
    output.flush().map_err(|e| PackageError::io(dest, e))?;
    drop(output);

    std::fs::set_permissions(dest, metadata.permissions()).map_err(|e| PackageError::io(dest, e))?;

    let atime = FileTime::from_last_access_time(&metadata);
    let mtime = FileTime::from_last_modification_time(&metadata);
    filetime::set_file_times(dest, atime, mtime).map_err(|e| PackageError::io(dest, e))?;

    Ok(copied)
}

//! Utility functions for replisync
//!
//! Path manipulation, modification-time helpers, and the copy primitive
//! used by the reconciler.
//!
//! ## Categories of Utilities
//!
//! ### Path Manipulation
//! - Converting absolute paths to tree-relative paths
//!
//! ### File Operations
//! - Modification-time extraction
//! - Copying a file while preserving its modification time
//!
//! ### Data Processing
//! - Byte formatting (human-readable sizes)
//!
//! ## Error Handling
//!
//! All fallible functions return `Result<T, SyncError>`. Callers in the
//! reconciler convert failures into per-entry report records rather than
//! propagating them.

use crate::error::{Result, SyncError};
use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Make a path relative to a tree root
///
/// Strips the root prefix lexically, without resolving symlinks; the
/// resulting relative path is the comparison key between source and
/// replica. The tree root itself maps to the empty relative path.
///
/// # Arguments
///
/// * `path` - The path to make relative
/// * `root` - The tree root to strip from the beginning
///
/// # Errors
///
/// - [`SyncError::PathOutsideRoot`] if `path` is not under `root`
///
/// # Example
///
/// ```rust,ignore
/// let root = Path::new("/data/source");
/// let relative = make_relative(Path::new("/data/source/a/b.txt"), root)?;
/// assert_eq!(relative, PathBuf::from("a/b.txt"));
/// ```
pub fn make_relative(path: &Path, root: &Path) -> Result<PathBuf> {
    path.strip_prefix(root)
        .map(|p| p.to_path_buf())
        .map_err(|_| SyncError::PathOutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })
}

/// Read a file's modification time
pub fn modified_time(path: &Path) -> Result<SystemTime> {
    Ok(fs::metadata(path)?.modified()?)
}

/// Copy a file and preserve its modification time
///
/// Copies `source` over `dest` (truncating any existing file), then
/// re-stamps `dest` with the source's modification time so that later
/// runs see the pair as in sync.
///
/// # Arguments
///
/// * `source` - File to copy from
/// * `dest` - File to copy to; parent directory must already exist
///
/// # Returns
///
/// Returns the number of bytes copied.
///
/// # Errors
///
/// - [`SyncError::Io`] if the copy or the timestamp update fails
pub fn copy_preserving_mtime(source: &Path, dest: &Path) -> Result<u64> {
    let bytes = fs::copy(source, dest)?;
    let metadata = fs::metadata(source)?;
    let mtime = FileTime::from_last_modification_time(&metadata);
    filetime::set_file_mtime(dest, mtime)?;
    Ok(bytes)
}

/// Format bytes in human-readable form
///
/// Converts a byte count into a string with binary units (1024-based).
/// Values under 1024 bytes are shown as whole numbers with "B"; larger
/// values get two decimal places.
///
/// # Example
///
/// ```rust,ignore
/// assert_eq!(format_bytes(0), "0 B");
/// assert_eq!(format_bytes(1536), "1.50 KB");
/// assert_eq!(format_bytes(1_048_576), "1.00 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_make_relative() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let file = root.join("subdir").join("file.txt");

        let relative = make_relative(&file, root).unwrap();
        assert_eq!(relative, PathBuf::from("subdir/file.txt"));

        // the root maps to the empty relative path
        let relative = make_relative(root, root).unwrap();
        assert_eq!(relative, PathBuf::new());
    }

    #[test]
    fn test_make_relative_outside_root() {
        let err = make_relative(Path::new("/elsewhere/x"), Path::new("/root")).unwrap_err();
        assert!(matches!(err, SyncError::PathOutsideRoot { .. }));
    }

    #[test]
    fn test_copy_preserving_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source.txt");
        let dest = temp_dir.path().join("dest.txt");

        fs::write(&source, b"payload").unwrap();
        let old = FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(&source, old).unwrap();

        let bytes = copy_preserving_mtime(&source, &dest).unwrap();
        assert_eq!(bytes, 7);
        assert_eq!(fs::read(&dest).unwrap(), b"payload");

        let dest_mtime = FileTime::from_last_modification_time(&fs::metadata(&dest).unwrap());
        assert_eq!(dest_mtime.unix_seconds(), old.unix_seconds());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1_048_576), "1.00 MB");
        assert_eq!(format_bytes(1_073_741_824), "1.00 GB");
    }
}

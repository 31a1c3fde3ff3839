//! Source tree enumeration for replisync
//!
//! This module produces the authoritative [`PathSet`] for a run: the set of
//! every relative path (directories and files) present in the source tree
//! at the moment enumeration begins. The reconciler's deletion pass
//! consumes the set to decide what may survive in the replica; the set is
//! rebuilt fresh on every run and never cached.
//!
//! ## Failure policy
//!
//! An unreadable sub-entry fails the whole run. A partially enumerated
//! source must never reach the deletion pass, because every path missing
//! from the set is slated for removal from the replica.
//!
//! ## Symlink policy
//!
//! Directory symlinks are not traversed unless
//! [`SyncOptions::follow_symlinks`](crate::types::SyncOptions) is set.
//! File symlinks are enumerated like regular files; the copy pass mirrors
//! their target content.

use crate::error::{Result, SyncError};
use crate::utils;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Kind of a source entry, tracked so the reconciler can detect a path
/// whose type changed between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// A directory (the source root included, as the empty relative path)
    Directory,
    /// A regular file or file symlink
    File,
}

/// The authoritative set of relative paths present in the source tree
///
/// Membership is decided by normalized relative path equality; there is no
/// case folding and no symlink resolution. Each member also carries its
/// [`PathKind`] so that a replica entry of the wrong type at a known path
/// is treated as stale.
///
/// # Examples
///
/// ```rust,no_run
/// use replisync::enumerator::enumerate;
/// use std::path::Path;
///
/// # fn main() -> replisync::Result<()> {
/// let set = enumerate(Path::new("./source"), false)?;
/// println!("{} source paths", set.len());
/// assert!(set.contains(Path::new("")));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct PathSet {
    paths: HashMap<PathBuf, PathKind>,
}

impl PathSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a relative path with its kind
    pub fn insert(&mut self, path: PathBuf, kind: PathKind) {
        self.paths.insert(path, kind);
    }

    /// Check whether a relative path is present, of any kind
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains_key(path)
    }

    /// Look up the kind recorded for a relative path
    pub fn kind_of(&self, path: &Path) -> Option<PathKind> {
        self.paths.get(path).copied()
    }

    /// Number of paths in the set
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Enumerate the source tree into the authoritative [`PathSet`]
///
/// Performs a full recursive traversal of `source_root`, adding the
/// relative path of every visited directory (the root itself included, as
/// the empty path) and every file. Traversal order is irrelevant; the
/// result is an unordered set.
///
/// # Arguments
///
/// * `source_root` - Tree treated as ground truth; must exist
/// * `follow_symlinks` - Whether to traverse into directory symlinks
///
/// # Errors
///
/// - [`SyncError::SourceMissing`] if the source root does not exist
/// - [`SyncError::Walk`] if any sub-entry becomes unreadable mid-walk
pub fn enumerate(source_root: &Path, follow_symlinks: bool) -> Result<PathSet> {
    if !source_root.is_dir() {
        return Err(SyncError::source_missing(source_root));
    }

    let mut set = PathSet::new();
    for entry in WalkDir::new(source_root).follow_links(follow_symlinks) {
        let entry = entry?;
        let relative = utils::make_relative(entry.path(), source_root)?;
        let kind = if entry.file_type().is_dir() {
            PathKind::Directory
        } else {
            PathKind::File
        };
        set.insert(relative, kind);
    }

    debug!(
        "enumerated {} paths under {}",
        set.len(),
        source_root.display()
    );
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_enumerate_collects_dirs_and_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("file1.txt"), "content1").unwrap();
        fs::create_dir(root.join("subdir")).unwrap();
        fs::write(root.join("subdir/file2.txt"), "content2").unwrap();

        let set = enumerate(root, false).unwrap();

        // root, file1.txt, subdir, subdir/file2.txt
        assert_eq!(set.len(), 4);
        assert_eq!(set.kind_of(Path::new("")), Some(PathKind::Directory));
        assert_eq!(set.kind_of(Path::new("file1.txt")), Some(PathKind::File));
        assert_eq!(set.kind_of(Path::new("subdir")), Some(PathKind::Directory));
        assert_eq!(
            set.kind_of(Path::new("subdir/file2.txt")),
            Some(PathKind::File)
        );
        assert!(!set.contains(Path::new("absent.txt")));
    }

    #[test]
    fn test_enumerate_empty_source() {
        let temp_dir = TempDir::new().unwrap();
        let set = enumerate(temp_dir.path(), false).unwrap();

        // only the root itself
        assert_eq!(set.len(), 1);
        assert!(set.contains(Path::new("")));
    }

    #[test]
    fn test_enumerate_missing_source_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");

        let err = enumerate(&missing, false).unwrap_err();
        assert!(err.is_source_missing());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_dir_not_traversed_by_default() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir(root.join("real")).unwrap();
        fs::write(root.join("real/inner.txt"), "x").unwrap();
        symlink(root.join("real"), root.join("link")).unwrap();

        let set = enumerate(root, false).unwrap();

        // the link shows up as a single file-like entry
        assert_eq!(set.kind_of(Path::new("link")), Some(PathKind::File));
        assert!(!set.contains(Path::new("link/inner.txt")));

        let followed = enumerate(root, true).unwrap();
        assert_eq!(followed.kind_of(Path::new("link")), Some(PathKind::Directory));
        assert!(followed.contains(Path::new("link/inner.txt")));
    }
}

//! Replica reconciliation for replisync
//!
//! The [`Reconciler`] corrects every difference between the replica tree
//! and the source tree in two passes, run in a fixed order:
//!
//! 1. **Deletion pass** - walk the replica bottom-up and remove every entry
//!    whose relative path is absent from the authoritative
//!    [`PathSet`](crate::enumerator::PathSet), or present with a different
//!    kind (a path that was a file and is now a directory, or the reverse).
//! 2. **Creation/copy pass** - walk the source top-down, create missing
//!    directories and copy files that are missing or stale in the replica.
//!
//! All deletions complete before any creation or copy begins, so a path
//! that changed type between runs is fully cleared before the matching
//! source entry is re-materialized.
//!
//! ## Failure isolation
//!
//! Each entry is reconciled independently. A delete, mkdir, or copy that
//! fails is logged at error level, recorded on the
//! [`SyncReport`](crate::types::SyncReport), and skipped; the run carries
//! on and the entry self-heals on a later interval.

use crate::enumerator::{PathKind, PathSet};
use crate::error::Result;
use crate::types::{EntryOutcome, SyncOptions, SyncReport};
use crate::utils;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, trace};
use walkdir::WalkDir;

/// Two-pass reconciler for one source/replica pair
///
/// Borrows its roots and options from the owning
/// [`Syncer`](crate::syncer::Syncer); a fresh instance is used per run.
#[derive(Debug)]
pub struct Reconciler<'a> {
    source_root: &'a Path,
    replica_root: &'a Path,
    options: &'a SyncOptions,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler over a source/replica pair
    pub fn new(source_root: &'a Path, replica_root: &'a Path, options: &'a SyncOptions) -> Self {
        Self {
            source_root,
            replica_root,
            options,
        }
    }

    /// Deletion pass: remove every replica entry not backed by the source
    ///
    /// The replica is walked bottom-up (children before their parent), so a
    /// stale directory is removed with its whole subtree in one step and a
    /// directory removal never fails on still-present children. An entry
    /// whose path is known but whose kind differs from the source is stale
    /// and removed the same way.
    ///
    /// Failures are per-entry: logged, recorded, skipped.
    pub fn delete_orphans(&self, authoritative: &PathSet, report: &mut SyncReport) {
        if !self.replica_root.exists() {
            debug!("replica {} not present, nothing to delete", self.replica_root.display());
            return;
        }

        for entry in WalkDir::new(self.replica_root).contents_first(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    // the replica is fully owned here, so a vanished or
                    // unreadable entry just waits for the next interval
                    error!("replica walk error: {}", e);
                    report.record_failure(format!("walk replica: {}", e));
                    continue;
                }
            };

            let relative = match utils::make_relative(entry.path(), self.replica_root) {
                Ok(relative) => relative,
                Err(e) => {
                    error!("{}", e);
                    report.record_failure(e.to_string());
                    continue;
                }
            };

            let kind = if entry.file_type().is_dir() {
                PathKind::Directory
            } else {
                PathKind::File
            };
            if authoritative.kind_of(&relative) == Some(kind) {
                continue;
            }

            let outcome = self.remove_stale(entry.path(), kind, report);
            report.tally(outcome);
        }
    }

    /// Creation/copy pass: materialize every source entry in the replica
    ///
    /// The source is walked top-down so parent directories exist before
    /// their contents are copied. A file is copied only when the replica
    /// copy is missing or strictly older than the source; equal or newer
    /// modification times leave the replica untouched.
    pub fn apply_source(&self, report: &mut SyncReport) {
        let walker = WalkDir::new(self.source_root).follow_links(self.options.follow_symlinks);
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    // the authoritative set is already fixed; an entry that
                    // vanished since enumeration is simply absent next run
                    error!("source walk error: {}", e);
                    report.record_failure(format!("walk source: {}", e));
                    continue;
                }
            };

            let relative = match utils::make_relative(entry.path(), self.source_root) {
                Ok(relative) => relative,
                Err(e) => {
                    error!("{}", e);
                    report.record_failure(e.to_string());
                    continue;
                }
            };
            if relative.as_os_str().is_empty() {
                continue;
            }

            let target = self.replica_root.join(&relative);
            let outcome = if entry.file_type().is_dir() {
                self.ensure_dir(&target, report)
            } else {
                self.sync_file(entry.path(), &target, report)
            };
            report.tally(outcome);
        }
    }

    /// Remove one stale replica entry
    fn remove_stale(&self, path: &Path, kind: PathKind, report: &mut SyncReport) -> EntryOutcome {
        if self.options.dry_run {
            info!("would remove {}", path.display());
            return EntryOutcome::Deleted;
        }

        let result = match kind {
            PathKind::Directory => fs::remove_dir_all(path).map(|()| {
                info!("removed directory {}", path.display());
            }),
            PathKind::File => {
                let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
                fs::remove_file(path).map(|()| {
                    report.bytes_deleted += size;
                    info!("removed file {}", path.display());
                })
            }
        };

        match result {
            Ok(()) => EntryOutcome::Deleted,
            Err(e) => {
                error!("failed to remove {}: {}", path.display(), e);
                report.record_failure(format!("remove {}: {}", path.display(), e));
                EntryOutcome::Failed
            }
        }
    }

    /// Create one replica directory if it is missing
    fn ensure_dir(&self, target: &Path, report: &mut SyncReport) -> EntryOutcome {
        if target.is_dir() {
            info!("directory {} already present", target.display());
            return EntryOutcome::Unchanged;
        }
        if self.options.dry_run {
            info!("would create directory {}", target.display());
            return EntryOutcome::CreatedDir;
        }

        match fs::create_dir_all(target) {
            Ok(()) => {
                info!("created directory {}", target.display());
                EntryOutcome::CreatedDir
            }
            Err(e) => {
                error!("failed to create directory {}: {}", target.display(), e);
                report.record_failure(format!("mkdir {}: {}", target.display(), e));
                EntryOutcome::Failed
            }
        }
    }

    /// Copy one source file into the replica if it is missing or stale
    fn sync_file(&self, source: &Path, target: &Path, report: &mut SyncReport) -> EntryOutcome {
        match self.needs_copy(source, target) {
            Ok(false) => {
                trace!("{} unchanged", target.display());
                EntryOutcome::Unchanged
            }
            Ok(true) => {
                if self.options.dry_run {
                    info!("would copy {} -> {}", source.display(), target.display());
                    return EntryOutcome::Copied;
                }
                match utils::copy_preserving_mtime(source, target) {
                    Ok(bytes) => {
                        report.bytes_copied += bytes;
                        info!("copied {} -> {}", source.display(), target.display());
                        EntryOutcome::Copied
                    }
                    Err(e) => {
                        error!("failed to copy {} -> {}: {}", source.display(), target.display(), e);
                        report.record_failure(format!("copy {}: {}", source.display(), e));
                        EntryOutcome::Failed
                    }
                }
            }
            Err(e) => {
                error!("failed to stat {}: {}", source.display(), e);
                report.record_failure(format!("stat {}: {}", source.display(), e));
                EntryOutcome::Failed
            }
        }
    }

    /// Copy decision: replica file missing, or source strictly newer
    ///
    /// Equal modification times count as in sync; a source rewritten
    /// within the same timestamp tick as the previous run is therefore
    /// not recopied until its mtime moves forward.
    fn needs_copy(&self, source: &Path, target: &Path) -> Result<bool> {
        if !target.exists() {
            return Ok(true);
        }
        let source_mtime = utils::modified_time(source)?;
        let replica_mtime = utils::modified_time(target)?;
        Ok(source_mtime > replica_mtime)
    }
}

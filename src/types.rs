//! Core data types used throughout the replisync library
//!
//! This module contains the data structures shared across the enumerator,
//! the reconciler, and the scheduler:
//!
//! - **Configuration**: [`SyncOptions`] - per-syncer behavior switches
//! - **Operations**: [`SyncReport`], [`EntryOutcome`] - results of a run and
//!   of reconciling a single entry
//!
//! A [`SyncReport`] is produced fresh by every run and never persisted; it
//! exists so callers can log, print, or serialize what a cycle did.

use crate::utils;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Behavior switches for a [`Syncer`](crate::syncer::Syncer)
///
/// # Examples
///
/// ```rust
/// use replisync::types::SyncOptions;
///
/// let options = SyncOptions {
///     dry_run: true,
///     ..Default::default()
/// };
/// assert!(!options.follow_symlinks);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Traverse into directory symlinks in the source tree
    ///
    /// Off by default: a symlinked directory is enumerated as a single
    /// entry and its target is not walked. File symlinks are always
    /// mirrored by content.
    pub follow_symlinks: bool,
    /// Log and count what a run would change without touching the replica
    pub dry_run: bool,
}

/// Result of reconciling one path
///
/// Used for logging and report tallies only; outcomes are not persisted
/// across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Entry was removed from the replica
    Deleted,
    /// Missing directory was created in the replica
    CreatedDir,
    /// File was copied over to the replica
    Copied,
    /// Replica entry was already up to date
    Unchanged,
    /// The operation was attempted and failed; the run continues
    Failed,
}

/// Statistics for one synchronization run
///
/// Every counter reflects operations actually performed (or, in dry-run
/// mode, operations that would have been performed). Per-entry failures
/// land in `failures` with the failing path and cause; they never abort
/// the run.
///
/// # Examples
///
/// ```rust,no_run
/// # use replisync::Syncer;
/// # fn main() -> replisync::Result<()> {
/// let syncer = Syncer::new("./source", "./replica")?;
/// let report = syncer.sync_once()?;
/// println!("copied {} files, removed {} entries",
///          report.files_copied, report.entries_deleted);
/// if !report.failures.is_empty() {
///     eprintln!("{} entries failed", report.failures.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
    /// Files copied into the replica
    pub files_copied: usize,
    /// Directories created in the replica
    pub dirs_created: usize,
    /// Entries deleted from the replica (a stale directory counts once,
    /// its already-deleted children having been counted individually)
    pub entries_deleted: usize,
    /// Entries already in sync and left untouched
    pub entries_unchanged: usize,
    /// Total bytes copied
    pub bytes_copied: u64,
    /// Total bytes deleted
    pub bytes_deleted: u64,
    /// Per-entry failures, each with the failing path and underlying cause
    pub failures: Vec<String>,
    /// Whether this run was a dry run
    pub dry_run: bool,
}

impl SyncReport {
    /// Create an empty report stamped with the current time
    pub fn new(dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            duration_ms: 0,
            files_copied: 0,
            dirs_created: 0,
            entries_deleted: 0,
            entries_unchanged: 0,
            bytes_copied: 0,
            bytes_deleted: 0,
            failures: Vec::new(),
            dry_run,
        }
    }

    /// Number of mutating operations this run performed
    ///
    /// Zero on the second of two back-to-back runs over an unchanged
    /// source.
    pub fn total_operations(&self) -> usize {
        self.files_copied + self.dirs_created + self.entries_deleted
    }

    /// Fold one entry outcome into the counters
    ///
    /// Failures are tallied through [`SyncReport::record_failure`], which
    /// carries the path and cause.
    pub fn tally(&mut self, outcome: EntryOutcome) {
        match outcome {
            EntryOutcome::Deleted => self.entries_deleted += 1,
            EntryOutcome::CreatedDir => self.dirs_created += 1,
            EntryOutcome::Copied => self.files_copied += 1,
            EntryOutcome::Unchanged => self.entries_unchanged += 1,
            EntryOutcome::Failed => {}
        }
    }

    /// Record a per-entry failure
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.failures.push(message.into());
    }

    /// One-line human-readable summary of the run
    pub fn summary(&self) -> String {
        let mut line = format!(
            "{} copied ({}), {} dirs created, {} removed, {} unchanged",
            self.files_copied,
            utils::format_bytes(self.bytes_copied),
            self.dirs_created,
            self.entries_deleted,
            self.entries_unchanged,
        );
        if !self.failures.is_empty() {
            line.push_str(&format!(", {} failed", self.failures.len()));
        }
        if self.dry_run {
            line.push_str(" [dry run]");
        }
        line
    }
}

//! # Replisync - Periodic one-way directory mirroring
//!
//! Replisync keeps a replica directory tree identical to a source tree:
//! after each run, the replica's file and directory set, contents, and
//! modification times match the source exactly, and anything present only
//! in the replica is deleted. It is built for unattended, recurring,
//! backup-style synchronization, not for bidirectional sync or conflict
//! resolution.
//!
//! ## Overview
//!
//! Every run is a complete, self-contained reconciliation in three steps:
//!
//! - **Enumeration**: walk the source tree and build the authoritative set
//!   of relative paths (every directory, the root included, and every
//!   file) that may exist in the replica
//! - **Deletion pass**: walk the replica bottom-up and remove every entry
//!   the set does not back, including entries whose type changed (a file
//!   where the source now has a directory, or the reverse)
//! - **Creation/copy pass**: walk the source top-down, create missing
//!   directories and copy files that are missing or whose source
//!   modification time is strictly newer than the replica's
//!
//! Deletions always complete before the first copy, copies preserve the
//! source modification time, and unchanged files cost no I/O. Individual
//! delete/mkdir/copy failures are logged and recorded on the run's
//! [`SyncReport`] without aborting the run; the affected entries self-heal
//! on a later interval.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use replisync::{Scheduler, Syncer};
//! use std::time::Duration;
//!
//! # fn main() -> replisync::Result<()> {
//! let syncer = Syncer::new("./photos", "/mnt/backup/photos")?;
//!
//! // one-shot
//! let report = syncer.sync_once()?;
//! println!("{}", report.summary());
//!
//! // or on an interval, until cancelled
//! let scheduler = Scheduler::new(Duration::from_secs(60));
//! let cancel = scheduler.cancel_flag();
//! // wire `cancel` to Ctrl-C or a service manager, then:
//! scheduler.run(&syncer)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Concepts
//!
//! ### Authoritative path set
//!
//! The set of all relative paths present in the source when enumeration
//! begins. It is the single source of truth for what may exist in the
//! replica after the run; it is rebuilt on every run and never cached.
//! If enumeration cannot read part of the source, the whole run fails
//! rather than letting a shrunken set drive deletions.
//!
//! ### Staleness
//!
//! A replica file is stale when the source file's modification time is
//! strictly greater. Equal modification times count as in sync, so a
//! source rewritten within the same timestamp tick as the previous run is
//! picked up only once its mtime moves forward. Content hashes are never
//! consulted.
//!
//! ### Failure isolation
//!
//! Only two conditions abort a run: a missing source root and an
//! enumeration read failure. Everything else is per-entry: caught, logged
//! with path and cause, recorded on the report, skipped.
//!
//! ## Module Organization
//!
//! - [`syncer`]: the [`Syncer`] entry point and its builder
//! - [`enumerator`]: source traversal and the authoritative [`PathSet`]
//! - [`reconciler`]: the deletion and creation/copy passes
//! - [`scheduler`]: the interval loop and cooperative cancellation
//! - [`types`]: options, reports, and per-entry outcomes
//! - [`error`]: error types and handling

pub mod enumerator;
pub mod error;
pub mod reconciler;
pub mod scheduler;
pub mod syncer;
pub mod types;

mod utils;

// Re-export main types for convenience
pub use enumerator::{enumerate, PathKind, PathSet};
pub use error::{Result, SyncError};
pub use reconciler::Reconciler;
pub use scheduler::{CancelFlag, Scheduler};
pub use syncer::{Syncer, SyncerBuilder};
pub use types::{EntryOutcome, SyncOptions, SyncReport};

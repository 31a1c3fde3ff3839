//! Main synchronization entry point
//!
//! This module provides the [`Syncer`] struct, the main entry point for
//! mirroring a source tree onto a replica tree. Each call to
//! [`Syncer::sync_once`] is a complete, self-contained reconciliation:
//!
//! 1. Enumerate the source into the authoritative path set (fatal if the
//!    source root is missing or unreadable).
//! 2. Create the replica root if absent.
//! 3. Run the reconciler's deletion pass, then its creation/copy pass.
//!
//! No state survives between runs except what is on disk; a later run
//! re-derives everything from the trees themselves.
//!
//! ## Examples
//!
//! ### Basic Usage
//!
//! ```rust,no_run
//! use replisync::Syncer;
//!
//! # fn main() -> replisync::Result<()> {
//! let syncer = Syncer::new("./photos", "/mnt/backup/photos")?;
//! let report = syncer.sync_once()?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```
//!
//! ### Using SyncerBuilder for Custom Configuration
//!
//! ```rust,no_run
//! use replisync::SyncerBuilder;
//!
//! # fn main() -> replisync::Result<()> {
//! let syncer = SyncerBuilder::new()
//!     .follow_symlinks(true)
//!     .dry_run(true)
//!     .build("./photos", "/mnt/backup/photos")?;
//! let report = syncer.sync_once()?;
//! assert!(report.dry_run);
//! # Ok(())
//! # }
//! ```

use crate::enumerator;
use crate::error::{Result, SyncError};
use crate::reconciler::Reconciler;
use crate::types::{SyncOptions, SyncReport};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, instrument};

/// One-way mirror of a source tree onto a replica tree
///
/// The source is read-only input; the replica is fully owned and mutated.
/// A single `Syncer` is meant to be invoked repeatedly by an external
/// trigger (see [`Scheduler`](crate::scheduler::Scheduler)); it performs no
/// scheduling of its own and holds no cross-run state.
#[derive(Debug)]
pub struct Syncer {
    /// Tree treated as ground truth
    source_root: PathBuf,
    /// Tree kept identical to the source
    replica_root: PathBuf,
    /// Behavior switches
    options: SyncOptions,
}

impl Syncer {
    /// Create a syncer with default options
    ///
    /// Equivalent to `SyncerBuilder::new().build(source_root, replica_root)`.
    ///
    /// # Errors
    ///
    /// - [`SyncError::InvalidConfiguration`] if the roots are equal or one
    ///   contains the other
    pub fn new(source_root: impl Into<PathBuf>, replica_root: impl Into<PathBuf>) -> Result<Self> {
        SyncerBuilder::new().build(source_root, replica_root)
    }

    /// The source root this syncer mirrors from
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// The replica root this syncer mirrors onto
    pub fn replica_root(&self) -> &Path {
        &self.replica_root
    }

    /// The options this syncer was built with
    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Run one complete reconciliation
    ///
    /// Mirrors the source onto the replica: enumerates the source, deletes
    /// every replica entry the source no longer backs, then creates missing
    /// directories and copies missing or stale files. Returns the run's
    /// [`SyncReport`].
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The source root does not exist at run start
    ///   ([`SyncError::SourceMissing`])
    /// - The source becomes unreadable mid-enumeration
    ///   ([`SyncError::Walk`]); a partially enumerated source is never
    ///   allowed to drive deletions
    /// - The replica root cannot be created
    ///
    /// Every other failure is per-entry: logged, recorded on the report,
    /// and skipped.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use replisync::Syncer;
    /// # fn main() -> replisync::Result<()> {
    /// let syncer = Syncer::new("./source", "./replica")?;
    /// let report = syncer.sync_once()?;
    /// if !report.failures.is_empty() {
    ///     eprintln!("{} entries failed this cycle", report.failures.len());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self))]
    pub fn sync_once(&self) -> Result<SyncReport> {
        info!(
            "sync started: {} -> {}",
            self.source_root.display(),
            self.replica_root.display()
        );
        let start = Instant::now();

        // fatal preconditions first; no mutation may have happened yet
        let authoritative = enumerator::enumerate(&self.source_root, self.options.follow_symlinks)?;

        if !self.replica_root.exists() && !self.options.dry_run {
            fs::create_dir_all(&self.replica_root)?;
            info!("created replica root {}", self.replica_root.display());
        }

        let mut report = SyncReport::new(self.options.dry_run);
        let reconciler = Reconciler::new(&self.source_root, &self.replica_root, &self.options);
        reconciler.delete_orphans(&authoritative, &mut report);
        reconciler.apply_source(&mut report);

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!("sync complete in {}ms: {}", report.duration_ms, report.summary());
        Ok(report)
    }
}

/// Builder for [`Syncer`] instances
///
/// # Examples
///
/// ```rust,no_run
/// use replisync::SyncerBuilder;
///
/// # fn main() -> replisync::Result<()> {
/// let syncer = SyncerBuilder::new()
///     .follow_symlinks(false)
///     .build("./data", "./data-mirror")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct SyncerBuilder {
    options: SyncOptions,
}

impl SyncerBuilder {
    /// Create a builder with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Traverse into directory symlinks in the source tree
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.options.follow_symlinks = follow;
        self
    }

    /// Log and count what a run would change without touching the replica
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.options.dry_run = dry_run;
        self
    }

    /// Build the syncer for a source/replica pair
    ///
    /// # Errors
    ///
    /// - [`SyncError::InvalidConfiguration`] if the roots are equal, if the
    ///   replica lies inside the source, or if the source lies inside the
    ///   replica. A nested pairing would make the deletion pass eat one of
    ///   the trees.
    pub fn build(
        self,
        source_root: impl Into<PathBuf>,
        replica_root: impl Into<PathBuf>,
    ) -> Result<Syncer> {
        let source_root = source_root.into();
        let replica_root = replica_root.into();

        if source_root == replica_root {
            return Err(SyncError::invalid_configuration(format!(
                "source and replica are the same path: {:?}",
                source_root
            )));
        }
        if replica_root.starts_with(&source_root) {
            return Err(SyncError::invalid_configuration(format!(
                "replica {:?} is inside source {:?}",
                replica_root, source_root
            )));
        }
        if source_root.starts_with(&replica_root) {
            return Err(SyncError::invalid_configuration(format!(
                "source {:?} is inside replica {:?}",
                source_root, replica_root
            )));
        }

        Ok(Syncer {
            source_root,
            replica_root,
            options: self.options,
        })
    }
}

//! Interval-driven run loop for replisync
//!
//! The [`Scheduler`] owns the periodic trigger: it invokes
//! [`Syncer::sync_once`] synchronously, sleeps the configured interval,
//! and repeats until its [`CancelFlag`] is tripped. Cancellation is
//! cooperative and checked only between runs; a run that has started
//! always completes its walk (modulo per-entry failures).
//!
//! The sync core never inspects process signals itself. Callers wire
//! whatever stop mechanism they have (Ctrl-C handler, service manager,
//! test harness) to a clone of the flag.

use crate::error::Result;
use crate::syncer::Syncer;
use crate::types::SyncReport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

/// Granularity of the inter-run sleep; cancellation latency is bounded by
/// this slice
const SLEEP_SLICE: Duration = Duration::from_millis(200);

/// Cloneable cancellation token checked between runs
///
/// # Examples
///
/// ```rust
/// use replisync::CancelFlag;
///
/// let flag = CancelFlag::new();
/// let handle = flag.clone();
/// assert!(!flag.is_cancelled());
/// handle.cancel();
/// assert!(flag.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a fresh, untripped flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop before the next cycle
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Fixed-interval driver for a [`Syncer`]
///
/// One cycle at a time, on a single thread: reconcile, sleep, repeat.
/// Preventing concurrent schedulers over the same source/replica pair is
/// the caller's responsibility.
///
/// # Examples
///
/// ```rust,no_run
/// use replisync::{Scheduler, Syncer};
/// use std::time::Duration;
///
/// # fn main() -> replisync::Result<()> {
/// let syncer = Syncer::new("./source", "./replica")?;
/// let scheduler = Scheduler::new(Duration::from_secs(30));
///
/// let cancel = scheduler.cancel_flag();
/// // hand `cancel` to a signal handler, then:
/// scheduler.run(&syncer)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Scheduler {
    interval: Duration,
    cancel: CancelFlag,
}

impl Scheduler {
    /// Create a scheduler with the given inter-run interval
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            cancel: CancelFlag::new(),
        }
    }

    /// A clone of this scheduler's cancellation flag
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Run reconciliation cycles until cancelled
    ///
    /// Equivalent to [`Scheduler::run_with`] with a no-op report callback.
    pub fn run(&self, syncer: &Syncer) -> Result<()> {
        self.run_with(syncer, |_| {})
    }

    /// Run reconciliation cycles until cancelled, observing each report
    ///
    /// `on_report` is called after every completed cycle, before the
    /// inter-run sleep.
    ///
    /// # Errors
    ///
    /// A fatal error from [`Syncer::sync_once`] (missing source root,
    /// enumeration failure) stops the loop and propagates. Per-entry
    /// failures never reach here; they are carried on the reports.
    pub fn run_with<F>(&self, syncer: &Syncer, mut on_report: F) -> Result<()>
    where
        F: FnMut(&SyncReport),
    {
        info!(
            "scheduler started: syncing every {}",
            humantime::format_duration(self.interval)
        );

        while !self.cancel.is_cancelled() {
            let report = syncer.sync_once()?;
            if !report.failures.is_empty() {
                warn!(
                    "cycle finished with {} failed entries; they will be retried next cycle",
                    report.failures.len()
                );
            }
            on_report(&report);

            if !self.sleep_between_runs() {
                break;
            }
        }

        info!("scheduler stopped");
        Ok(())
    }

    /// Sleep the interval in short slices, returning false once cancelled
    fn sleep_between_runs(&self) -> bool {
        let mut remaining = self.interval;
        while !remaining.is_zero() {
            if self.cancel.is_cancelled() {
                return false;
            }
            let nap = remaining.min(SLEEP_SLICE);
            thread::sleep(nap);
            remaining -= nap;
        }
        !self.cancel.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_flag_shared_across_clones() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        assert!(!clone.is_cancelled());
        flag.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_pre_cancelled_scheduler_runs_nothing() {
        let temp = tempfile::TempDir::new().unwrap();
        let source = temp.path().join("source");
        let replica = temp.path().join("replica");
        std::fs::create_dir(&source).unwrap();
        std::fs::write(source.join("a.txt"), "a").unwrap();

        let syncer = Syncer::new(&source, &replica).unwrap();
        let scheduler = Scheduler::new(Duration::from_millis(1));
        scheduler.cancel_flag().cancel();

        let mut cycles = 0;
        scheduler.run_with(&syncer, |_| cycles += 1).unwrap();

        assert_eq!(cycles, 0);
        assert!(!replica.exists());
    }

    #[test]
    fn test_missing_source_stops_the_loop() {
        let temp = tempfile::TempDir::new().unwrap();
        let syncer =
            Syncer::new(temp.path().join("gone"), temp.path().join("replica")).unwrap();
        let scheduler = Scheduler::new(Duration::from_millis(1));

        let err = scheduler.run(&syncer).unwrap_err();
        assert!(err.is_source_missing());
    }
}

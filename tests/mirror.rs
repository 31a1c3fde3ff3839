//! Integration tests for replisync
//!
//! Drives the public API the way the CLI does: repeated scheduled cycles
//! over live trees, cancellation from another thread, and recovery from
//! out-of-band replica edits between cycles.

use replisync::{Scheduler, Syncer};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn setup() -> (TempDir, PathBuf, PathBuf) {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("source");
    let replica = temp.path().join("replica");
    fs::create_dir(&source).unwrap();
    (temp, source, replica)
}

#[test]
fn scheduler_cycles_until_cancelled() {
    let (_temp, source, replica) = setup();
    fs::write(source.join("a.txt"), "a").unwrap();

    let syncer = Syncer::new(&source, &replica).unwrap();
    let scheduler = Scheduler::new(Duration::from_millis(10));
    let cancel = scheduler.cancel_flag();

    let cycles = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&cycles);

    let canceller = thread::spawn(move || {
        // let a few cycles happen, then request a stop
        while seen.load(Ordering::SeqCst) < 3 {
            thread::sleep(Duration::from_millis(5));
        }
        cancel.cancel();
    });

    scheduler
        .run_with(&syncer, |report| {
            assert!(report.failures.is_empty());
            cycles.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    canceller.join().unwrap();

    assert!(cycles.load(Ordering::SeqCst) >= 3);
    assert_eq!(fs::read_to_string(replica.join("a.txt")).unwrap(), "a");
}

#[test]
fn replica_tampering_heals_on_the_next_cycle() {
    let (_temp, source, replica) = setup();
    fs::create_dir(source.join("docs")).unwrap();
    fs::write(source.join("docs/readme.md"), "# readme").unwrap();
    fs::write(source.join("data.bin"), vec![0u8; 256]).unwrap();

    let syncer = Syncer::new(&source, &replica).unwrap();
    syncer.sync_once().unwrap();

    // tamper: delete one file, plant an orphan tree
    fs::remove_file(replica.join("data.bin")).unwrap();
    fs::create_dir_all(replica.join("intruder/nested")).unwrap();
    fs::write(replica.join("intruder/nested/junk.txt"), "junk").unwrap();

    let report = syncer.sync_once().unwrap();

    assert!(replica.join("data.bin").exists());
    assert!(!replica.join("intruder").exists());
    assert_eq!(report.files_copied, 1);
    assert!(report.entries_deleted >= 1);
}

#[test]
fn emptied_source_empties_the_replica() {
    let (_temp, source, replica) = setup();
    fs::create_dir(source.join("sub")).unwrap();
    fs::write(source.join("sub/x.txt"), "x").unwrap();
    fs::write(source.join("y.txt"), "y").unwrap();

    let syncer = Syncer::new(&source, &replica).unwrap();
    syncer.sync_once().unwrap();

    fs::remove_dir_all(source.join("sub")).unwrap();
    fs::remove_file(source.join("y.txt")).unwrap();

    syncer.sync_once().unwrap();

    assert!(replica.is_dir());
    assert_eq!(fs::read_dir(&replica).unwrap().count(), 0);
}

#[test]
fn report_serializes_for_machine_consumers() {
    let (_temp, source, replica) = setup();
    fs::write(source.join("a.txt"), "a").unwrap();

    let syncer = Syncer::new(&source, &replica).unwrap();
    let report = syncer.sync_once().unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["files_copied"], 1);
    assert_eq!(json["dry_run"], false);
    assert!(json["started_at"].is_string());
}

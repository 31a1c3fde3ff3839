//! # Replisync CLI - One-way periodic directory mirroring
//!
//! Command-line front end for the replisync library. Mirrors SOURCE onto
//! REPLICA once per interval until interrupted, logging every mutation to
//! the console and to a durable log file.
//!
//! ## Usage
//! ```bash
//! # mirror every 30 seconds (the default) until Ctrl-C
//! replisync ./photos /mnt/backup/photos
//!
//! # custom interval and log file
//! replisync ./photos /mnt/backup/photos --interval 5m --log-file /var/log/replisync.log
//!
//! # single cycle, machine-readable summary
//! replisync ./photos /mnt/backup/photos --once --json
//!
//! # see what would change without touching the replica
//! replisync ./photos /mnt/backup/photos --once --dry-run
//! ```

use anyhow::Context;
use clap::Parser;
use colored::*;
use replisync::{Scheduler, SyncReport, SyncerBuilder};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Replisync - keep a replica directory identical to a source directory
#[derive(Parser)]
#[command(name = "replisync")]
#[command(version)]
#[command(about = "One-way periodic directory mirroring")]
#[command(long_about = None)]
struct Cli {
    /// Source directory (ground truth, never modified)
    source: PathBuf,

    /// Replica directory kept in sync with the source (created if missing)
    replica: PathBuf,

    /// Interval between synchronization cycles (e.g. 30s, 5m, 1h)
    #[arg(short, long, default_value = "30s")]
    interval: humantime::Duration,

    /// File receiving a durable copy of the run log
    #[arg(short, long, default_value = "replisync.log")]
    log_file: PathBuf,

    /// Run a single synchronization cycle and exit
    #[arg(long)]
    once: bool,

    /// Report what would change without touching the replica
    #[arg(long)]
    dry_run: bool,

    /// Print a JSON run summary after each cycle
    #[arg(long)]
    json: bool,

    /// Follow directory symlinks in the source tree
    #[arg(long)]
    follow_symlinks: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    }

    if let Err(e) = run(cli) {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // the guard must outlive the run so buffered log lines reach the file
    let _guard = init_logging(&cli.log_file, cli.verbose)?;

    let syncer = SyncerBuilder::new()
        .follow_symlinks(cli.follow_symlinks)
        .dry_run(cli.dry_run)
        .build(cli.source, cli.replica)?;

    if cli.once {
        let report = syncer.sync_once()?;
        print_report(&report, cli.json)?;
        return Ok(());
    }

    let scheduler = Scheduler::new(cli.interval.into());
    let cancel = scheduler.cancel_flag();

    // Ctrl-C requests a cooperative stop, honored between cycles
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start signal listener")?;
    runtime.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("stop requested, finishing current cycle");
            cancel.cancel();
        }
    });

    let json = cli.json;
    scheduler.run_with(&syncer, |report| {
        if json {
            let _ = print_report(report, true);
        }
    })?;

    Ok(())
}

/// Set up console plus append-mode file logging
fn init_logging(log_file: &Path, verbose: bool) -> anyhow::Result<WorkerGuard> {
    if let Some(parent) = log_file.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create log directory {:?}", parent))?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("failed to open log file {:?}", log_file))?;
    let (file_writer, guard) = tracing_appender::non_blocking(file);

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    Ok(guard)
}

fn print_report(report: &SyncReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let label = if report.dry_run {
        "Dry run:".yellow().bold()
    } else {
        "Synchronized:".green().bold()
    };
    println!("{} {}", label, report.summary());
    for failure in &report.failures {
        println!("  {} {}", "failed".red(), failure);
    }
    Ok(())
}

//! markers-replay - Drive the tracking engine from a scripted world.
//!
//! Usage: markers-replay [--config <tracking.toml>] <scenario.toml>
//!
//! Output: one JSON object per emitted TRACK/UNTRACK event on stdout.

mod scenario;

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use markers_core::tracking::load_or_default;
use markers_core::{ManualClock, ScanOutcome, ScanScheduler, TrackingEvent};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing_subscriber::filter::EnvFilter;

use crate::scenario::{ReplayError, Scenario, ScenarioWorld};

#[derive(Parser)]
#[command(version, about = "Replay a scripted world through the tracking engine")]
struct Cli {
    /// Tracking configuration; defaults to the user config directory
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scenario file to replay
    scenario: PathBuf,
}

/// One stdout line
#[derive(Serialize)]
struct EventLine<'a> {
    at_ms: u64,
    #[serde(flatten)]
    event: &'a TrackingEvent<u32>,
}

const LOG_PATH_VAR: &str = "MARKERS_LOG_PATH";

/// Where log output goes. Stdout is reserved for events.
#[derive(Debug)]
enum LogTarget {
    File(File),
    Stderr,
    /// A log file was requested but could not be opened
    Unavailable { path: PathBuf, error: io::Error },
}

impl LogTarget {
    fn resolve(path: Option<PathBuf>) -> Self {
        let Some(path) = path else {
            return Self::Stderr;
        };
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => Self::File(file),
            Err(error) => Self::Unavailable { path, error },
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match LogTarget::resolve(std::env::var_os(LOG_PATH_VAR).map(PathBuf::from)) {
        LogTarget::File(file) => subscriber.with_ansi(false).with_writer(file).init(),
        LogTarget::Stderr => subscriber.with_writer(io::stderr).init(),
        LogTarget::Unavailable { path, error } => {
            subscriber.with_writer(io::stderr).init();
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "Could not open {}, logging to stderr",
                LOG_PATH_VAR
            );
        }
    }
}

fn run(cli: &Cli) -> Result<(), ReplayError> {
    let config = load_or_default(cli.config.as_deref())?;
    let scenario = Scenario::load(&cli.scenario)?;

    let (tx, mut rx) = mpsc::unbounded_channel::<TrackingEvent<u32>>();
    let engine = ScanScheduler::with_clock(
        ScenarioWorld::new(&scenario),
        ManualClock::new(),
        Arc::new(tx),
        &config,
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut emitted = 0usize;

    for tick in &scenario.ticks {
        engine.clock().set_ms(tick.at_ms);
        engine.world().apply(tick);

        if tick.reset {
            engine.reset_all(&config);
        }
        for &entity in &tick.disallow {
            engine.disallow_entity(entity);
        }

        match engine.run_pass() {
            ScanOutcome::Completed(report) => tracing::debug!(
                at_ms = tick.at_ms,
                tracked = report.tracked,
                untracked = report.untracked,
                at_capacity = report.at_capacity,
                "Tick replayed"
            ),
            outcome => tracing::debug!(at_ms = tick.at_ms, ?outcome, "Pass skipped"),
        }

        while let Ok(event) = rx.try_recv() {
            serde_json::to_writer(
                &mut out,
                &EventLine {
                    at_ms: tick.at_ms,
                    event: &event,
                },
            )?;
            writeln!(out)?;
            emitted += 1;
        }
    }
    out.flush()?;

    tracing::info!(
        ticks = scenario.ticks.len(),
        passes = engine.completed_passes(),
        events = emitted,
        "Replay finished"
    );
    Ok(())
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        tracing::error!(error = %e, "Replay failed");
        std::process::exit(1);
    }
}

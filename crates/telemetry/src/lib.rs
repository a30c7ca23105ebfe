//! Telemetry - logging setup and run metrics
//!
//! Logging goes to two places: a compact console layer on stderr, so stdout
//! stays reserved for result rows, and an append-only diagnostic file that
//! keeps warnings and errors across runs.

mod counters;

pub use crate::counters::{
    describe_metrics, record_completed, record_dispatched, record_persistence_error, Outcome,
};

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Diagnostic log written next to the working directory by default.
pub const DEFAULT_LOG_FILE: &str = "triager_error_log.txt";

/// Open (or create) the diagnostic log for appending.
pub fn open_log_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber.
///
/// `verbose` picks the console level (0 = info, 1 = debug, 2+ = trace)
/// unless `RUST_LOG` is set. The diagnostic file always records WARN and up.
pub fn init_logging(verbose: u8, log_file: &Path) -> Result<()> {
    let file = open_log_file(log_file)
        .with_context(|| format!("Error opening log file {}", log_file.display()))?;

    let log_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let console_layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_target(false)
        .with_ansi(false)
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

//! Logging infrastructure.
//!
//! This module provides structured logging using the `log` facade and `env_logger` backend.
//! Log levels are determined by (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (error only) or `--verbose` (debug/trace)
//! 3. Default: warn level
//!
//! The GUI build has no console, so lines written to stderr are only seen when
//! the program is started from a terminal. A `log_file` in the configuration
//! sends them to a file instead. A watcher worker without a log file logs
//! nothing: its stderr is the error channel back to the launcher.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use env_logger::{Builder, Target};
use log::LevelFilter;

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    /// Standard error.
    Stderr,
    /// Appended to a file.
    File(PathBuf),
    /// Discarded.
    Off,
}

impl LogSink {
    /// Choose the sink for this process.
    #[must_use]
    pub fn select(worker: bool, log_file: Option<&Path>) -> Self {
        match log_file {
            Some(path) => Self::File(path.to_path_buf()),
            None if worker => Self::Off,
            None => Self::Stderr,
        }
    }
}

/// Initialize the logging subsystem.
///
/// # Arguments
///
/// * `verbose` - Verbosity count from CLI (0=warn, 1=debug, 2+=trace)
/// * `quiet` - If true, only log errors (overridden by RUST_LOG)
/// * `sink` - Destination of log lines
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a logger is already
/// installed.
pub fn init_logging(verbose: u8, quiet: bool, sink: LogSink) -> Result<()> {
    let mut builder = Builder::new();

    match sink {
        LogSink::Off => {
            builder.filter_level(LevelFilter::Off);
        }
        LogSink::Stderr => {
            apply_level(&mut builder, verbose, quiet);
            builder.target(Target::Stderr);
        }
        LogSink::File(ref path) => {
            apply_level(&mut builder, verbose, quiet);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            builder.target(Target::Pipe(Box::new(file)));
        }
    }

    builder.format(|buf, record| {
        let level = record.level();
        let level_style = buf.default_level_style(level);
        writeln!(
            buf,
            "{} {level_style}{:<5}{level_style:#} [pid {}] {}",
            buf.timestamp_seconds(),
            level,
            std::process::id(),
            record.args()
        )
    });

    builder
        .try_init()
        .context("Logging was already initialized")?;

    log::debug!("Logging initialized ({:?})", sink);
    Ok(())
}

/// Initialize logging for this process from its mode and configuration.
///
/// A `log_file` that cannot be opened is reported as a warning and logging
/// continues on the sink the process would use without one.
///
/// # Errors
///
/// Returns an error if a logger is already installed.
pub fn init_for_process(verbose: u8, quiet: bool, worker: bool, log_file: Option<&Path>) -> Result<()> {
    let sink = LogSink::select(worker, log_file);
    let Err(e) = init_logging(verbose, quiet, sink) else {
        return Ok(());
    };
    if log_file.is_none() {
        return Err(e);
    }

    let fallback = LogSink::select(worker, None);
    init_logging(verbose, quiet, fallback.clone())?;
    log::warn!("{:#}; logging to {:?} instead", e, fallback);
    Ok(())
}

fn apply_level(builder: &mut Builder, verbose: u8, quiet: bool) {
    if std::env::var_os("RUST_LOG").is_some() {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }
}

/// Determine the log level from CLI flags.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

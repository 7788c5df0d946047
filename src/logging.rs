//! File logging.
//!
//! A TUI owns the terminal, so logs go to a daily rolling file only. The
//! returned [`WorkerGuard`] must live for the whole run or buffered lines are
//! lost on exit.

use std::path::PathBuf;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogSettings, default_log_dir};


/// Environment variable that overrides the filter before `RUST_LOG`.
pub const LOG_ENV: &str = "VIBE_LOG";
const FILE_PREFIX: &str = "vibe.log";
const MAX_LOG_FILES: usize = 7;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("no directory available for log files")]
    NoDirectory,
    #[error("could not create log directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not open log file: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("logging already initialized: {0}")]
    AlreadyInit(#[from] tracing_subscriber::util::TryInitError),
}

/// Filter directive: `VIBE_LOG`, then `RUST_LOG`, then the configured level.
pub fn filter_directive(settings: &LogSettings) -> String {
    [LOG_ENV, EnvFilter::DEFAULT_ENV]
        .iter()
        .filter_map(|k| std::env::var(k).ok())
        .find(|v| !v.trim().is_empty())
        .unwrap_or_else(|| settings.level.clone())
}

pub fn log_dir(settings: &LogSettings) -> Option<PathBuf> {
    settings.directory.clone().or_else(default_log_dir)
}

/// Install the global subscriber writing to the rolling log file.
pub fn init(settings: &LogSettings) -> Result<WorkerGuard, LoggingError> {
    let dir = log_dir(settings).ok_or(LoggingError::NoDirectory)?;
    std::fs::create_dir_all(&dir)?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(FILE_PREFIX)
        .max_log_files(MAX_LOG_FILES)
        .build(&dir)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_new(filter_directive(settings))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()?;

    tracing::info!(dir = %dir.display(), "logging initialized");
    Ok(guard)
}

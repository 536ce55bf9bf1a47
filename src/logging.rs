//! Logging initialization for sitedemo.
//!
//! Player mode: logs to `<state>/logs/sitedemo-{datetime}.log`
//! CLI and headless modes: logs to stderr

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Result of logging initialization
pub struct LoggingHandle {
    /// Guard that must be kept alive for the duration of the program.
    /// When dropped, ensures all buffered logs are flushed.
    pub _guard: Option<WorkerGuard>,

    /// Path to the log file (only set when the player logs to a file)
    pub log_file_path: Option<PathBuf>,
}

/// Log file name for a given timestamp
fn log_filename(now: chrono::DateTime<chrono::Utc>) -> String {
    format!("sitedemo-{}.log", now.format("%Y%m%dT%H%M%SZ"))
}

/// Whether logs go to a file rather than stderr
fn logs_to_file(config: &Config, is_tui_mode: bool) -> bool {
    is_tui_mode && config.logging.to_file
}

/// Level filter: `RUST_LOG` wins, then `--debug`, then the configured level
fn level_filter(config: &Config, debug_override: bool) -> EnvFilter {
    if let Ok(directives) = std::env::var("RUST_LOG") {
        return EnvFilter::new(directives);
    }
    if debug_override {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(&config.logging.level)
    }
}

/// Where log lines end up
enum LogSink {
    File { dir: PathBuf, name: String },
    Stderr,
}

impl LogSink {
    fn choose(config: &Config, is_tui_mode: bool) -> Self {
        if logs_to_file(config, is_tui_mode) {
            LogSink::File {
                dir: config.logs_path(),
                name: log_filename(chrono::Utc::now()),
            }
        } else {
            LogSink::Stderr
        }
    }

    fn path(&self) -> Option<PathBuf> {
        match self {
            LogSink::File { dir, name } => Some(dir.join(name)),
            LogSink::Stderr => None,
        }
    }
}

/// Install the global subscriber.
///
/// The player owns the terminal, so it logs to a file under the state
/// directory; every other mode logs to stderr. Both go through a
/// non-blocking writer whose guard flushes on drop.
pub fn init_logging(
    config: &Config,
    is_tui_mode: bool,
    debug_override: bool,
) -> Result<LoggingHandle> {
    let sink = LogSink::choose(config, is_tui_mode);
    let log_file_path = sink.path();

    let (writer, guard) = match &sink {
        LogSink::File { dir, name } => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create logs directory {}", dir.display()))?;
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name))
        }
        LogSink::Stderr => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::registry()
        .with(level_filter(config, debug_override))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(matches!(sink, LogSink::Stderr))
                .with_writer(writer),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(LoggingHandle {
        _guard: Some(guard),
        log_file_path,
    })
}

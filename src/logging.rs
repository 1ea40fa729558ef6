//! File-backed tracing setup.
//!
//! The interactive session owns the terminal, so logs never go to stderr.
//! They land in `<cache dir>/hwinfo/logs/hwinfo.log`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Log file name inside the log directory.
pub const LOG_FILE: &str = "hwinfo.log";

/// Returns the default log directory.
///
/// On macOS: ~/Library/Caches/hwinfo/logs/
pub fn default_log_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("hwinfo")
        .join("logs")
}

/// Levels accepted by `--log-level`.
pub const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Parse a bare level name. Target directives are not accepted here.
pub fn parse_level(level: &str) -> Result<LevelFilter, AppError> {
    level
        .parse::<LevelFilter>()
        .map_err(|_| AppError::LogLevel(level.to_string()))
}

/// Build the level filter. `RUST_LOG` wins over the configured level.
pub fn env_filter(level: &str) -> Result<EnvFilter, AppError> {
    let fallback = parse_level(level)?;
    Ok(EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(fallback.into())))
}

/// Install the global subscriber writing to `dir/hwinfo.log`.
///
/// Keep the returned guard alive for the whole run; dropping it flushes
/// and stops the background writer.
pub fn init_logging(dir: &Path, level: &str) -> Result<WorkerGuard, AppError> {
    let filter = env_filter(level)?;
    fs::create_dir_all(dir).map_err(|source| AppError::Logging {
        path: dir.to_path_buf(),
        source,
    })?;

    let file_appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();

    tracing::info!(log = %dir.join(LOG_FILE).display(), "logging initialized");
    Ok(guard)
}

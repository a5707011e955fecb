//! Tracing subscriber setup.
//!
//! Logs go to stderr and, when a directory is configured, to a daily
//! rolling file written on a background thread. `RUST_LOG` overrides the
//! configured level.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use time::macros::format_description;
use time::UtcOffset;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Default log file name prefix; the appender adds the date.
pub const DEFAULT_LOG_FILE_PREFIX: &str = "scopeview.log";

/// Logging errors.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{filter}': {message}")]
    InvalidFilter { filter: String, message: String },

    #[error("Failed to create log directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("A global tracing subscriber is already installed: {0}")]
    AlreadyInitialized(String),
}

/// Logging setup.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset, e.g. `info` or `scopeview=debug`.
    pub level: String,
    /// Directory for daily log files; stderr only when `None`.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
    /// Colorize stderr output.
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: DEFAULT_LOG_FILE_PREFIX.to_string(),
            ansi: true,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }
}

/// Keeps the file writer alive; dropping it flushes buffered lines.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
    directory: Option<PathBuf>,
}

impl LoggingGuard {
    /// Directory receiving log files, if file logging is on.
    pub fn directory(&self) -> Option<&PathBuf> {
        self.directory.as_ref()
    }
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Fails on an unparsable level, an uncreatable log directory, or when a
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    let filter = build_filter(&config.level)?;

    // Local offset must be read before other threads start
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let timer = OffsetTime::new(
        offset,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"),
    );

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_timer(timer.clone())
        .with_ansi(config.ansi)
        .with_target(false);

    let (file_layer, file_guard) = match &config.directory {
        Some(directory) => {
            std::fs::create_dir_all(directory).map_err(|source| LoggingError::Directory {
                path: directory.clone(),
                source,
            })?;
            let appender = tracing_appender::rolling::daily(directory, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_timer(timer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
        directory: config.directory.clone(),
    })
}

/// `RUST_LOG` if set and valid, else `level`.
fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|e| LoggingError::InvalidFilter {
        filter: level.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.directory.is_none());
        assert_eq!(config.file_prefix, DEFAULT_LOG_FILE_PREFIX);
    }

    #[test]
    fn test_builder() {
        let config = LoggingConfig::default().with_level("debug").with_directory("/tmp/logs");
        assert_eq!(config.level, "debug");
        assert_eq!(config.directory, Some(PathBuf::from("/tmp/logs")));
    }

    #[test]
    fn test_build_filter_accepts_directives() {
        assert!(build_filter("scopeview=debug,warn").is_ok());
    }

    // Installs the global subscriber; keep this the only test that does
    #[test]
    fn test_init_writes_log_file() {
        let dir = TempDir::new().unwrap();
        let log_dir = dir.path().join("logs");
        let config = LoggingConfig {
            ansi: false,
            ..LoggingConfig::default().with_directory(&log_dir)
        };

        let guard = init_logging(&config).unwrap();
        assert_eq!(guard.directory(), Some(&log_dir));
        tracing::info!("log file smoke test");
        drop(guard);

        let files: Vec<_> = std::fs::read_dir(&log_dir).unwrap().collect();
        assert_eq!(files.len(), 1);

        assert!(matches!(
            init_logging(&LoggingConfig::default()),
            Err(LoggingError::AlreadyInitialized(_))
        ));
    }
}

//! CLI error type.

use std::fmt;
use std::path::PathBuf;

use scopeview::config::ConfigError;
use scopeview::logging::LoggingError;
use scopeview::raster::RasterError;
use scopeview::scan::ScanError;
use scopeview::viewer::ViewerError;

/// Errors reported by `scopeview` subcommands.
#[derive(Debug)]
pub enum CliError {
    /// Invalid settings or arguments.
    Config(String),
    /// Reading or writing the configuration file failed.
    ConfigFile(ConfigError),
    /// Logging could not be set up.
    Logging(LoggingError),
    /// The input image could not be opened or decoded.
    Image { path: PathBuf, message: String },
    /// The decoded image is not a usable raster.
    Raster(RasterError),
    Viewer(ViewerError),
    Scan(ScanError),
    /// Output serialization failed.
    Json(serde_json::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Logging(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::Image { path, message } => {
                write!(f, "Failed to open image {}: {}", path.display(), message)
            }
            CliError::Raster(e) => write!(f, "Unsupported image: {}", e),
            CliError::Viewer(e) => write!(f, "Viewer error: {}", e),
            CliError::Scan(e) => write!(f, "Scan error: {}", e),
            CliError::Json(e) => write!(f, "Failed to serialize output: {}", e),
        }
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<RasterError> for CliError {
    fn from(e: RasterError) -> Self {
        CliError::Raster(e)
    }
}

impl From<ViewerError> for CliError {
    fn from(e: ViewerError) -> Self {
        CliError::Viewer(e)
    }
}

impl From<ScanError> for CliError {
    fn from(e: ScanError) -> Self {
        CliError::Scan(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

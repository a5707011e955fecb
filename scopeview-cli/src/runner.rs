//! Shared setup for commands that do real work.

use scopeview::config::ConfigFile;
use scopeview::logging::{init_logging, LoggingGuard};
use tracing::info;

use crate::error::CliError;

/// Loads the configuration and installs logging for a command run.
pub struct CliRunner {
    config: ConfigFile,
    _logging: LoggingGuard,
}

impl CliRunner {
    /// Load `config.ini` and start logging; `verbose` forces debug output.
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;
        let mut logging = config.logging.to_logging_config();
        if verbose {
            logging.level = "debug".to_string();
        }
        let guard = init_logging(&logging)?;
        Ok(Self {
            config,
            _logging: guard,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn log_startup(&self, command: &str) {
        info!(version = scopeview::VERSION, command, "ScopeView starting");
    }
}

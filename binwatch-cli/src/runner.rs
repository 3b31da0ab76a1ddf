//! Shared start-up for long-running commands.

use std::path::Path;

use binwatch::config::ConfigFile;
use binwatch::logging::{init_logging, LoggingGuard};
use tracing::info;

use crate::commands::common::load_config;
use crate::error::CliError;

/// Loaded configuration plus an installed logger.
pub struct CliRunner {
    config: ConfigFile,
    logging: LoggingGuard,
}

impl CliRunner {
    pub fn new(config_path: Option<&Path>, verbose: bool) -> Result<Self, CliError> {
        let config = load_config(config_path)?;
        let logging = init_logging(&config.logging.directory, &config.logging.file, verbose)
            .map_err(CliError::Logging)?;
        Ok(Self { config, logging })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn log_startup(&self, command: &str) {
        info!(
            version = binwatch::VERSION,
            command,
            log_file = %self.logging.log_path().display(),
            "binwatch starting"
        );
    }
}

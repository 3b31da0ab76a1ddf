//! CLI error type.

use std::fmt;
use std::io;
use std::path::PathBuf;

use binwatch::app::AppError;
use binwatch::classify::ClassifyError;
use binwatch::config::ConfigError;
use binwatch::http::HttpError;

/// Errors reported by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Invalid arguments or configuration.
    Config(String),

    /// Configuration file could not be loaded or saved.
    ConfigFile(ConfigError),

    /// Kiosk failed to start.
    App(AppError),

    /// Image file could not be loaded.
    Image { path: PathBuf, reason: String },

    /// Classifier request failed.
    Classify(ClassifyError),

    /// Logging could not be initialised.
    Logging(io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "{}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::App(e) => write!(f, "{}", e),
            CliError::Image { path, reason } => {
                write!(f, "Failed to load image {}: {}", path.display(), reason)
            }
            CliError::Classify(e) => write!(f, "Classification failed: {}", e),
            CliError::Logging(e) => write!(f, "Failed to initialise logging: {}", e),
        }
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::App(e)
    }
}

impl From<ClassifyError> for CliError {
    fn from(e: ClassifyError) -> Self {
        CliError::Classify(e)
    }
}

impl From<HttpError> for CliError {
    fn from(e: HttpError) -> Self {
        CliError::Classify(ClassifyError::Http(e))
    }
}

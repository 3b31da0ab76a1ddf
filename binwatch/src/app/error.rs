//! Application-level errors.

use std::fmt;

use crate::announce::AnnounceError;
use crate::classify::ClassifyError;
use crate::config::ConfigError;
use crate::http::HttpError;

/// Errors that stop the kiosk from starting.
#[derive(Debug)]
pub enum AppError {
    /// Configuration could not be loaded or is inconsistent.
    Config(ConfigError),

    /// A required setting is missing.
    MissingSetting(String),

    /// HTTP client could not be created.
    Http(HttpError),

    /// Classifier could not be set up.
    Classifier(ClassifyError),

    /// Speech output could not be set up.
    Announce(AnnounceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
            AppError::MissingSetting(msg) => write!(f, "Missing setting: {}", msg),
            AppError::Http(e) => write!(f, "Failed to create HTTP client: {}", e),
            AppError::Classifier(e) => write!(f, "Failed to set up classifier: {}", e),
            AppError::Announce(e) => write!(f, "Failed to set up announcements: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(e) => Some(e),
            AppError::MissingSetting(_) => None,
            AppError::Http(e) => Some(e),
            AppError::Classifier(e) => Some(e),
            AppError::Announce(e) => Some(e),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e)
    }
}

impl From<HttpError> for AppError {
    fn from(e: HttpError) -> Self {
        AppError::Http(e)
    }
}

impl From<ClassifyError> for AppError {
    fn from(e: ClassifyError) -> Self {
        AppError::Classifier(e)
    }
}

impl From<AnnounceError> for AppError {
    fn from(e: AnnounceError) -> Self {
        AppError::Announce(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::MissingSetting("camera.snapshot_url".to_string());
        assert!(err.to_string().contains("Missing setting"));
        assert!(err.to_string().contains("camera.snapshot_url"));
    }

    #[test]
    fn test_app_error_from_classify_error() {
        let err: AppError = ClassifyError::MissingApiKey("OPENAI_API_KEY".to_string()).into();
        assert!(matches!(err, AppError::Classifier(_)));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}

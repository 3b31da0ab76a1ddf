//! Configuration file handling.
//!
//! Configuration lives in an INI file, by default
//! `<config dir>/binwatch/config.ini`. Every key is optional; a missing file
//! means all defaults. Values are parsed and validated at load time so a
//! typo fails at startup instead of mid-session.

mod file;
mod parse;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::region::RegionError;

pub use file::{
    config_file_path, CameraSettings, CameraSource, ClassifierSettings, ConfigFile,
    LoggingSettings, MotionSettings, ScanSettings, SpeechBackend, SpeechSettings,
    TrackingSettings,
};
pub use parse::expand_tilde;

/// Errors from loading or saving the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read or written.
    #[error("failed to access config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// File is not valid INI.
    #[error("failed to parse config file {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    /// A key holds a value of the wrong form.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// The bin regions do not form a valid set.
    #[error("invalid [regions]: {0}")]
    Region(#[from] RegionError),
}

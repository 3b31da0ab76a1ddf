//! Application bootstrap.
//!
//! [`KioskApp`] turns a loaded [`ConfigFile`](crate::config::ConfigFile)
//! into a running [`SessionController`](crate::tracking::SessionController):
//! it picks the camera source, the classifier and the speech backend, and
//! keeps a [`Scoreboard`](crate::scoreboard::Scoreboard) handle for the
//! end-of-run summary.
//!
//! # Example
//!
//! ```ignore
//! use binwatch::app::{AppConfig, KioskApp};
//! use binwatch::config::ConfigFile;
//!
//! let config = AppConfig::from_config_file(&ConfigFile::load()?)?;
//! let mut app = KioskApp::start(config)?;
//! app.run(&shutdown);
//! println!("{}", app.summary());
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::KioskApp;
pub use config::{AppConfig, CameraTarget};
pub use error::AppError;

//! binwatch - Bin-arrival detection for a waste-sorting kiosk
//!
//! A camera watches several disposal bins. Once an item has been classified,
//! the kiosk tracks which bin actually receives each of its components by
//! differencing successive frames inside per-bin regions, and announces
//! whether the user sorted correctly.
//!
//! # Architecture
//!
//! ```text
//! ProximitySensor ──► Classifier::classify ──► ExpectedItems
//!                                                  │
//!                                                  ▼
//! Camera ──► RegionScanner ──► BinArrivalTracker ──► VerdictEngine ──► Announcer
//!            (MotionDetector)                                      └─► ResultLog
//! ```
//!
//! The [`tracking::SessionController`] owns every collaborator and drives the
//! SCANNING → TRACKING → SCANNING cycle.

pub mod announce;
pub mod app;
pub mod camera;
pub mod classify;
pub mod config;
pub mod frame;
pub mod http;
pub mod logging;
pub mod motion;
pub mod region;
pub mod scoreboard;
pub mod tracking;
pub mod verdict;

#[cfg(test)]
pub(crate) mod testing;

/// Library version, used in CLI banners and the classifier user agent.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

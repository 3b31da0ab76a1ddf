//! Motion detection over bin regions.
//!
//! The [`MotionDetector`] compares two frames inside a single region; the
//! [`RegionScanner`] applies it to the ordered region list and returns the
//! first region that fired together with a settled, masked image of it.
//!
//! # Example
//!
//! ```ignore
//! use binwatch::motion::{MotionConfig, MotionDetector, RegionScanner};
//!
//! let scanner = RegionScanner::new(
//!     MotionDetector::new(MotionConfig::default()),
//!     Duration::from_millis(150),
//! );
//! let outcome = scanner.scan(&current, &previous, regions.as_slice(), &mut camera);
//! if let Some(region_id) = outcome.fired {
//!     // identify the item in outcome.masked
//! }
//! ```

mod detector;
mod scanner;

pub use detector::{
    Detection, MotionConfig, MotionDetector, DEFAULT_PIXEL_THRESHOLD, DEFAULT_RATIO_THRESHOLD,
};
pub use scanner::{RegionScanner, ScanOutcome, DEFAULT_SETTLE_DELAY};

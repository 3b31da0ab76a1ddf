//! Region-restricted frame differencing.
//!
//! # Algorithm
//!
//! ```text
//! for each pixel inside the region:
//!     changed += |current - previous| > pixel_threshold
//! ratio = changed / region_area
//! fired = ratio >= ratio_threshold
//! ```
//!
//! Pixels outside the region are never visited, which is equivalent to
//! zeroing them in both frames before differencing.

use image::{GrayImage, Luma};

use crate::frame::Frame;
use crate::region::{Rect, Region};

/// Default binarization threshold on the 0–255 intensity scale.
pub const DEFAULT_PIXEL_THRESHOLD: u8 = 40;

/// Default fraction of the region that must change to fire.
pub const DEFAULT_RATIO_THRESHOLD: f64 = 0.02;

/// Thresholds for the motion detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionConfig {
    /// A pixel counts as changed when its absolute difference exceeds this.
    pub pixel_threshold: u8,
    /// Fraction of changed pixels (0.0–1.0) at which a region fires.
    pub ratio_threshold: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            pixel_threshold: DEFAULT_PIXEL_THRESHOLD,
            ratio_threshold: DEFAULT_RATIO_THRESHOLD,
        }
    }
}

impl MotionConfig {
    pub fn with_pixel_threshold(mut self, threshold: u8) -> Self {
        self.pixel_threshold = threshold;
        self
    }

    pub fn with_ratio_threshold(mut self, threshold: f64) -> Self {
        self.ratio_threshold = threshold;
        self
    }
}

/// Result of comparing one region across two frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Whether the ratio reached the threshold.
    pub fired: bool,
    /// Changed pixels divided by region area.
    pub ratio: f64,
    /// Number of pixels above the binarization threshold.
    pub changed_pixels: u64,
}

impl Detection {
    /// A detection with no change.
    pub fn quiet() -> Self {
        Self {
            fired: false,
            ratio: 0.0,
            changed_pixels: 0,
        }
    }
}

/// Compares two frames inside a single region.
#[derive(Debug, Clone, Default)]
pub struct MotionDetector {
    config: MotionConfig,
}

impl MotionDetector {
    pub fn new(config: MotionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Compare `current` against `previous` inside `region`.
    pub fn detect(&self, current: &Frame, previous: &Frame, region: &Region) -> Detection {
        self.detect_rect(current.gray(), previous.gray(), region.rect())
    }

    /// Compare two intensity rasters inside `rect`.
    ///
    /// Frames of different sizes never fire. The ratio is always relative to
    /// the full rectangle area, even if part of it lies past the frame edge.
    pub fn detect_rect(&self, current: &GrayImage, previous: &GrayImage, rect: &Rect) -> Detection {
        if current.dimensions() != previous.dimensions() {
            tracing::warn!(
                current = ?current.dimensions(),
                previous = ?previous.dimensions(),
                "Frame size changed between polls, skipping motion check"
            );
            return Detection::quiet();
        }

        let (width, height) = current.dimensions();
        let x_end = rect.x_max().min(width);
        let y_end = rect.y_max().min(height);

        let mut changed_pixels = 0u64;
        for y in rect.y_min()..y_end {
            for x in rect.x_min()..x_end {
                let Luma([now]) = *current.get_pixel(x, y);
                let Luma([before]) = *previous.get_pixel(x, y);
                if now.abs_diff(before) > self.config.pixel_threshold {
                    changed_pixels += 1;
                }
            }
        }

        let ratio = changed_pixels as f64 / rect.area() as f64;
        Detection {
            fired: ratio >= self.config.ratio_threshold,
            ratio,
            changed_pixels,
        }
    }
}

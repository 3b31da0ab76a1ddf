//! First-match scanning across the bin regions.

use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use super::detector::{Detection, MotionDetector};
use crate::camera::Camera;
use crate::frame::Frame;
use crate::region::Region;

/// Default pause before re-capturing a fired region, so the user's hand can
/// clear the bin opening.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(150);

/// Outcome of scanning one poll.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Id of the first region that fired.
    pub fired: Option<usize>,
    /// Settled frame masked to the fired region.
    pub masked: Option<Frame>,
    /// The settled frame itself, a better baseline for the next poll.
    pub settled: Option<Frame>,
}

impl ScanOutcome {
    /// No region fired.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_fired(&self) -> bool {
        self.fired.is_some()
    }
}

/// Applies the [`MotionDetector`] to an ordered list of regions.
///
/// Regions are checked in order and scanning stops at the first one that
/// fires: one item is assumed to land in at most one bin per poll, and
/// adjacent regions would otherwise report the same drop twice.
#[derive(Debug, Clone)]
pub struct RegionScanner {
    detector: MotionDetector,
    settle_delay: Duration,
}

impl Default for RegionScanner {
    fn default() -> Self {
        Self::new(MotionDetector::default(), DEFAULT_SETTLE_DELAY)
    }
}

impl RegionScanner {
    pub fn new(detector: MotionDetector, settle_delay: Duration) -> Self {
        Self {
            detector,
            settle_delay,
        }
    }

    pub fn detector(&self) -> &MotionDetector {
        &self.detector
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// The first region, in order, whose motion ratio reaches the threshold.
    pub fn first_fired<'r>(
        &self,
        current: &Frame,
        previous: &Frame,
        regions: &'r [Region],
    ) -> Option<(&'r Region, Detection)> {
        regions.iter().find_map(|region| {
            let detection = self.detector.detect(current, previous, region);
            detection.fired.then_some((region, detection))
        })
    }

    /// Detection result for every region, in order. Used for diagnostics.
    pub fn measure(&self, current: &Frame, previous: &Frame, regions: &[Region]) -> Vec<Detection> {
        regions
            .iter()
            .map(|region| self.detector.detect(current, previous, region))
            .collect()
    }

    /// Scan one poll and, on fire, capture a settled image of the region.
    ///
    /// If the settle capture fails the poll reports no fire: a missed
    /// detection is preferred over a verdict computed from a stale image.
    pub fn scan(
        &self,
        current: &Frame,
        previous: &Frame,
        regions: &[Region],
        camera: &mut dyn Camera,
    ) -> ScanOutcome {
        let Some((region, detection)) = self.first_fired(current, previous, regions) else {
            return ScanOutcome::none();
        };

        debug!(
            region = region.id(),
            bin = region.bin_name(),
            ratio = format!("{:.3}", detection.ratio),
            "Region fired"
        );

        if !self.settle_delay.is_zero() {
            thread::sleep(self.settle_delay);
        }

        match camera.capture_frame() {
            Ok(settled) => ScanOutcome {
                fired: Some(region.id()),
                masked: Some(settled.masked(region.rect())),
                settled: Some(settled),
            },
            Err(e) => {
                warn!(
                    region = region.id(),
                    error = %e,
                    "Settle capture failed, dropping detection"
                );
                ScanOutcome::none()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Rect;
    use crate::testing::{frame_with_patch, solid_frame, MockCamera};

    fn regions() -> Vec<Region> {
        vec![
            Region::new(0, "Compost", Rect::new(0, 20, 0, 20).unwrap()),
            Region::new(1, "Recycling", Rect::new(20, 40, 0, 20).unwrap()),
            Region::new(2, "Garbage", Rect::new(40, 60, 0, 20).unwrap()),
        ]
    }

    fn scanner() -> RegionScanner {
        RegionScanner::new(MotionDetector::default(), Duration::ZERO)
    }

    #[test]
    fn test_no_motion_returns_none() {
        let frame = solid_frame(60, 20, 50);
        let mut camera = MockCamera::new(vec![frame.clone()]);

        let outcome = scanner().scan(&frame, &frame, &regions(), &mut camera);
        assert!(outcome.fired.is_none());
        assert!(outcome.masked.is_none());
        assert_eq!(camera.captures(), 0);
    }

    #[test]
    fn test_first_match_wins_when_several_fire() {
        let before = solid_frame(60, 20, 0);
        // Change covers both recycling and garbage
        let after = frame_with_patch(60, 20, 0, &Rect::new(20, 60, 0, 20).unwrap(), 255);
        let mut camera = MockCamera::new(vec![after.clone()]);

        let outcome = scanner().scan(&after, &before, &regions(), &mut camera);
        assert_eq!(outcome.fired, Some(1));
    }

    #[test]
    fn test_first_match_respects_given_order() {
        let before = solid_frame(60, 20, 0);
        let after = frame_with_patch(60, 20, 0, &Rect::new(0, 60, 0, 20).unwrap(), 255);
        let mut reversed = regions();
        reversed.reverse();

        let (region, _) = scanner().first_fired(&after, &before, &reversed).unwrap();
        assert_eq!(region.id(), 2);
    }

    #[test]
    fn test_fire_produces_masked_settled_image() {
        let before = solid_frame(60, 20, 0);
        let after = frame_with_patch(60, 20, 0, &Rect::new(40, 60, 0, 20).unwrap(), 255);
        let settled = frame_with_patch(60, 20, 90, &Rect::new(40, 60, 0, 20).unwrap(), 200);
        let mut camera = MockCamera::new(vec![settled.clone()]);

        let outcome = scanner().scan(&after, &before, &regions(), &mut camera);
        assert_eq!(outcome.fired, Some(2));
        assert_eq!(camera.captures(), 1);

        let masked = outcome.masked.unwrap();
        assert_eq!(masked.gray().get_pixel(5, 5).0, [0]);
        assert_eq!(masked.gray().get_pixel(45, 5).0, [200]);
        assert_eq!(outcome.settled.unwrap().gray().get_pixel(5, 5).0, [90]);
    }

    #[test]
    fn test_settle_capture_failure_reports_no_fire() {
        let before = solid_frame(60, 20, 0);
        let after = frame_with_patch(60, 20, 0, &Rect::new(0, 20, 0, 20).unwrap(), 255);
        let mut camera = MockCamera::failing();

        let outcome = scanner().scan(&after, &before, &regions(), &mut camera);
        assert!(!outcome.is_fired());
        assert!(outcome.masked.is_none());
    }

    #[test]
    fn test_measure_reports_every_region() {
        let before = solid_frame(60, 20, 0);
        let after = frame_with_patch(60, 20, 0, &Rect::new(20, 40, 0, 10).unwrap(), 255);

        let detections = scanner().measure(&after, &before, &regions());
        assert_eq!(detections.len(), 3);
        assert!(!detections[0].fired);
        assert!(detections[1].fired);
        assert!((detections[1].ratio - 0.5).abs() < 1e-9);
        assert!(!detections[2].fired);
    }
}

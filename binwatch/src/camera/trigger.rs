//! Proximity trigger built on the bin camera.
//!
//! Instead of a dedicated distance sensor, the kiosk watches a "scan zone"
//! of the camera frame where users present items. When the zone changes
//! enough to fire the motion detector, the trigger waits for the item to
//! settle and hands back a fresh frame for classification.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::{Camera, CameraError, ProximitySensor};
use crate::frame::Frame;
use crate::motion::MotionDetector;
use crate::region::Region;

/// Default pause between scan-zone polls.
pub const DEFAULT_TRIGGER_POLL: Duration = Duration::from_millis(100);

/// [`ProximitySensor`] that fires on motion inside a scan zone.
#[derive(Debug)]
pub struct ScanZoneTrigger {
    zone: Region,
    detector: MotionDetector,
    settle_delay: Duration,
    poll_interval: Duration,
    baseline: Option<Frame>,
}

impl ScanZoneTrigger {
    pub fn new(zone: Region, detector: MotionDetector, settle_delay: Duration) -> Self {
        Self {
            zone,
            detector,
            settle_delay,
            poll_interval: DEFAULT_TRIGGER_POLL,
            baseline: None,
        }
    }

    /// Set the pause between polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn zone(&self) -> &Region {
        &self.zone
    }
}

impl ProximitySensor for ScanZoneTrigger {
    fn await_object(
        &mut self,
        camera: &mut dyn Camera,
        timeout: Duration,
    ) -> Result<Option<Frame>, CameraError> {
        let deadline = Instant::now() + timeout;

        loop {
            let frame = camera.capture_frame()?;

            let Some(previous) = self.baseline.replace(frame.clone()) else {
                debug!("Scan zone baseline captured");
                continue;
            };

            let detection = self.detector.detect(&frame, &previous, &self.zone);
            if detection.fired {
                info!(
                    ratio = format!("{:.3}", detection.ratio),
                    "Item presented in scan zone"
                );
                if !self.settle_delay.is_zero() {
                    thread::sleep(self.settle_delay);
                }
                let settled = camera.capture_frame()?;
                self.baseline = Some(settled.clone());
                return Ok(Some(settled));
            }

            if Instant::now() >= deadline {
                return Ok(None);
            }
            if !self.poll_interval.is_zero() {
                thread::sleep(self.poll_interval);
            }
        }
    }

    fn reset(&mut self) {
        self.baseline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Rect;
    use crate::testing::{frame_with_patch, solid_frame, MockCamera};

    fn trigger() -> ScanZoneTrigger {
        let zone = Region::new(0, "scan", Rect::new(0, 10, 0, 10).unwrap());
        ScanZoneTrigger::new(zone, MotionDetector::default(), Duration::ZERO)
            .with_poll_interval(Duration::ZERO)
    }

    #[test]
    fn test_times_out_on_static_scene() {
        let mut camera = MockCamera::new(vec![solid_frame(20, 20, 40)]);
        let mut trigger = trigger();

        let result = trigger
            .await_object(&mut camera, Duration::from_millis(5))
            .unwrap();
        assert!(result.is_none());
        assert!(camera.captures() >= 2);
    }

    #[test]
    fn test_fires_on_zone_change_and_returns_settled_frame() {
        let empty = solid_frame(20, 20, 40);
        let item = frame_with_patch(20, 20, 40, &Rect::new(2, 8, 2, 8).unwrap(), 220);
        let settled = frame_with_patch(20, 20, 40, &Rect::new(2, 8, 2, 8).unwrap(), 180);
        let mut camera = MockCamera::new(vec![empty, item, settled]);
        let mut trigger = trigger();

        let frame = trigger
            .await_object(&mut camera, Duration::from_secs(1))
            .unwrap()
            .unwrap();
        assert_eq!(frame.gray().get_pixel(4, 4).0, [180]);
        assert_eq!(camera.captures(), 3);
    }

    #[test]
    fn test_change_outside_zone_is_ignored() {
        let empty = solid_frame(20, 20, 40);
        let elsewhere = frame_with_patch(20, 20, 40, &Rect::new(12, 20, 12, 20).unwrap(), 250);
        let mut camera = MockCamera::new(vec![empty, elsewhere]);
        let mut trigger = trigger();

        let result = trigger
            .await_object(&mut camera, Duration::from_millis(5))
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_capture_error_propagates() {
        let mut camera = MockCamera::failing();
        let mut trigger = trigger();

        assert!(trigger
            .await_object(&mut camera, Duration::from_millis(5))
            .is_err());
    }

    #[test]
    fn test_reset_discards_baseline() {
        let empty = solid_frame(20, 20, 40);
        let item = frame_with_patch(20, 20, 40, &Rect::new(0, 10, 0, 10).unwrap(), 220);
        let mut trigger = trigger();

        let mut camera = MockCamera::new(vec![empty]);
        let _ = trigger.await_object(&mut camera, Duration::ZERO).unwrap();

        // Without reset the changed scene would fire immediately
        trigger.reset();
        let mut camera = MockCamera::new(vec![item]);
        let result = trigger
            .await_object(&mut camera, Duration::from_millis(5))
            .unwrap();
        assert!(result.is_none());
    }
}

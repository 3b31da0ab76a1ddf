//! Test doubles shared by the unit tests.
//!
//! Every mock is a cheap handle over shared state: tests box one clone into
//! the code under test and keep another to script and inspect it.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use image::{GrayImage, Luma};
use parking_lot::Mutex;

use crate::announce::Announcer;
use crate::camera::{Camera, CameraError, ProximitySensor};
use crate::classify::{Classifier, ClassifyError, Component, UNIDENTIFIED};
use crate::frame::Frame;
use crate::region::Rect;
use crate::scoreboard::{ResultLog, ResultRecord};

/// Uniform grey frame.
pub fn solid_frame(width: u32, height: u32, value: u8) -> Frame {
    Frame::from_gray(GrayImage::from_pixel(width, height, Luma([value])))
}

/// Grey frame with `patch` filled with `value`.
pub fn frame_with_patch(width: u32, height: u32, base: u8, patch: &Rect, value: u8) -> Frame {
    Frame::from_gray(GrayImage::from_fn(width, height, |x, y| {
        if patch.contains(x, y) {
            Luma([value])
        } else {
            Luma([base])
        }
    }))
}

#[derive(Debug, Default)]
struct CameraScript {
    frames: Vec<Frame>,
    next: usize,
    captures: usize,
    failing: bool,
}

/// Camera replaying a fixed frame sequence, repeating the last frame once
/// the sequence is exhausted. An empty sequence fails every capture.
#[derive(Debug, Clone, Default)]
pub struct MockCamera {
    script: Arc<Mutex<CameraScript>>,
}

impl MockCamera {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            script: Arc::new(Mutex::new(CameraScript {
                frames,
                ..CameraScript::default()
            })),
        }
    }

    pub fn failing() -> Self {
        let camera = Self::new(Vec::new());
        camera.script.lock().failing = true;
        camera
    }

    /// Number of capture attempts so far.
    pub fn captures(&self) -> usize {
        self.script.lock().captures
    }
}

impl Camera for MockCamera {
    fn capture_frame(&mut self) -> Result<Frame, CameraError> {
        let mut script = self.script.lock();
        script.captures += 1;
        if script.failing || script.frames.is_empty() {
            return Err(CameraError::Unavailable("mock camera has no frames".to_string()));
        }

        let index = script.next.min(script.frames.len() - 1);
        script.next += 1;
        Ok(script.frames[index].clone())
    }
}

#[derive(Debug, Default)]
struct ProximityScript {
    results: VecDeque<Option<Frame>>,
    resets: usize,
}

/// Proximity sensor returning scripted results, then timeouts.
#[derive(Debug, Clone, Default)]
pub struct MockProximity {
    script: Arc<Mutex<ProximityScript>>,
}

impl MockProximity {
    pub fn new(results: Vec<Option<Frame>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(ProximityScript {
                results: results.into(),
                resets: 0,
            })),
        }
    }

    pub fn push(&self, result: Option<Frame>) {
        self.script.lock().results.push_back(result);
    }

    pub fn clear(&self) {
        self.script.lock().results.clear();
    }

    pub fn resets(&self) -> usize {
        self.script.lock().resets
    }
}

impl ProximitySensor for MockProximity {
    fn await_object(
        &mut self,
        _camera: &mut dyn Camera,
        _timeout: Duration,
    ) -> Result<Option<Frame>, CameraError> {
        Ok(self.script.lock().results.pop_front().flatten())
    }

    fn reset(&mut self) {
        self.script.lock().resets += 1;
    }
}

#[derive(Debug, Default)]
struct ClassifierScript {
    components: Vec<Component>,
    classify_error: Option<ClassifyError>,
    parts: VecDeque<Result<String, ClassifyError>>,
    classify_calls: usize,
    part_requests: Vec<Vec<String>>,
}

/// Classifier with a fixed component list and scripted part answers.
///
/// Part answers are consumed in order; the last one repeats. With no
/// answers scripted every part is [`UNIDENTIFIED`].
#[derive(Debug, Clone, Default)]
pub struct MockClassifier {
    script: Arc<Mutex<ClassifierScript>>,
}

impl MockClassifier {
    pub fn new(components: Vec<Component>) -> Self {
        Self {
            script: Arc::new(Mutex::new(ClassifierScript {
                components,
                ..ClassifierScript::default()
            })),
        }
    }

    pub fn with_parts(self, parts: Vec<&str>) -> Self {
        self.script
            .lock()
            .parts
            .extend(parts.into_iter().map(|p| Ok(p.to_string())));
        self
    }

    pub fn with_part_error(self, error: ClassifyError) -> Self {
        self.script.lock().parts.push_back(Err(error));
        self
    }

    pub fn with_classify_error(self, error: ClassifyError) -> Self {
        self.script.lock().classify_error = Some(error);
        self
    }

    pub fn classify_calls(&self) -> usize {
        self.script.lock().classify_calls
    }

    /// Candidate lists passed to `identify_part`, in call order.
    pub fn part_requests(&self) -> Vec<Vec<String>> {
        self.script.lock().part_requests.clone()
    }
}

impl Classifier for MockClassifier {
    fn classify(&self, _frame: &Frame) -> Result<Vec<Component>, ClassifyError> {
        let mut script = self.script.lock();
        script.classify_calls += 1;
        match &script.classify_error {
            Some(error) => Err(error.clone()),
            None => Ok(script.components.clone()),
        }
    }

    fn identify_part(&self, _frame: &Frame, candidates: &[String]) -> Result<String, ClassifyError> {
        let mut script = self.script.lock();
        script.part_requests.push(candidates.to_vec());
        let answer = if script.parts.len() > 1 {
            script.parts.pop_front()
        } else {
            script.parts.front().cloned()
        };
        answer.unwrap_or_else(|| Ok(UNIDENTIFIED.to_string()))
    }
}

/// Announcer that records every message.
#[derive(Debug, Clone, Default)]
pub struct RecordingAnnouncer {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingAnnouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl Announcer for RecordingAnnouncer {
    fn announce(&self, text: &str) {
        self.messages.lock().push(text.to_string());
    }
}

/// Result log that records every entry.
#[derive(Debug, Clone, Default)]
pub struct RecordingLog {
    records: Arc<Mutex<Vec<ResultRecord>>>,
}

impl RecordingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ResultRecord> {
        self.records.lock().clone()
    }
}

impl ResultLog for RecordingLog {
    fn log_result(&mut self, record: ResultRecord) {
        self.records.lock().push(record);
    }
}

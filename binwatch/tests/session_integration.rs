//! Integration tests for the kiosk session cycle.
//!
//! These tests drive a [`SessionController`] through the public API only:
//! - Scanning → classification → tracking
//! - Bin arrivals judged against the classification
//! - Window expiry and early completion
//!
//! Run with: `cargo test --test session_integration`

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use image::{GrayImage, Luma};
use parking_lot::Mutex;

use binwatch::announce::{Announcer, CommentBook};
use binwatch::camera::{Camera, CameraError, ProximitySensor};
use binwatch::classify::{Classifier, ClassifyError, Component, FixedClassifier};
use binwatch::frame::Frame;
use binwatch::motion::{MotionConfig, MotionDetector, RegionScanner};
use binwatch::region::{Rect, RegionSet};
use binwatch::scoreboard::Scoreboard;
use binwatch::tracking::{Collaborators, ControllerConfig, SessionController, StepOutcome};
use binwatch::verdict::Correctness;

// ============================================================================
// Helper Functions
// ============================================================================

const WIDTH: u32 = 60;
const HEIGHT: u32 = 20;
const BACKGROUND: u8 = 40;
const ITEM: u8 = 220;

/// Bins side by side, 20 pixels wide each.
fn bins() -> RegionSet {
    RegionSet::new(
        vec![
            ("Compost".to_string(), Rect::new(0, 20, 0, 20).unwrap()),
            ("Recycling".to_string(), Rect::new(20, 40, 0, 20).unwrap()),
            ("Garbage".to_string(), Rect::new(40, 60, 0, 20).unwrap()),
        ],
        WIDTH,
        HEIGHT,
    )
    .unwrap()
}

/// Frame with an item lying in each of the given bins.
fn scene(filled: &[usize]) -> Frame {
    let regions = bins();
    Frame::from_gray(GrayImage::from_fn(WIDTH, HEIGHT, |x, y| {
        let occupied = filled.iter().any(|&id| {
            regions
                .get(id)
                .map(|region| region.rect().contains(x, y))
                .unwrap_or(false)
        });
        Luma([if occupied { ITEM } else { BACKGROUND }])
    }))
}

fn takeout_cup() -> Vec<Component> {
    vec![
        Component::new("Cup", "Paper", "Compost"),
        Component::new("Lid", "Polystyrene", "Garbage"),
        Component::new("Box", "Cardboard", "Recycling"),
    ]
}

/// Camera replaying frames, repeating the last one.
#[derive(Clone)]
struct ReplayCamera {
    frames: Arc<Mutex<VecDeque<Frame>>>,
}

impl ReplayCamera {
    fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: Arc::new(Mutex::new(frames.into())),
        }
    }
}

impl Camera for ReplayCamera {
    fn capture_frame(&mut self) -> Result<Frame, CameraError> {
        let mut frames = self.frames.lock();
        match frames.len() {
            0 => Err(CameraError::Unavailable("no frames".to_string())),
            1 => Ok(frames[0].clone()),
            _ => frames
                .pop_front()
                .ok_or_else(|| CameraError::Unavailable("no frames".to_string())),
        }
    }
}

/// Presents one item on the first wait, then times out.
struct OneItem {
    presented: bool,
}

impl ProximitySensor for OneItem {
    fn await_object(
        &mut self,
        _camera: &mut dyn Camera,
        _timeout: Duration,
    ) -> Result<Option<Frame>, CameraError> {
        if self.presented {
            return Ok(None);
        }
        self.presented = true;
        Ok(Some(scene(&[])))
    }
}

/// Classifier naming parts in a fixed order.
struct ScriptedClassifier {
    components: Vec<Component>,
    parts: Mutex<VecDeque<&'static str>>,
    requests: Arc<Mutex<Vec<Vec<String>>>>,
}

impl Classifier for ScriptedClassifier {
    fn classify(&self, _frame: &Frame) -> Result<Vec<Component>, ClassifyError> {
        Ok(self.components.clone())
    }

    fn identify_part(&self, _frame: &Frame, candidates: &[String]) -> Result<String, ClassifyError> {
        self.requests.lock().push(candidates.to_vec());
        Ok(self
            .parts
            .lock()
            .pop_front()
            .unwrap_or("unidentified")
            .to_string())
    }
}

#[derive(Clone, Default)]
struct Transcript {
    lines: Arc<Mutex<Vec<String>>>,
}

impl Announcer for Transcript {
    fn announce(&self, text: &str) {
        self.lines.lock().push(text.to_string());
    }
}

struct Kiosk {
    controller: SessionController,
    transcript: Transcript,
    scoreboard: Scoreboard,
    requests: Arc<Mutex<Vec<Vec<String>>>>,
}

fn kiosk(config: ControllerConfig, frames: Vec<Frame>, parts: Vec<&'static str>) -> Kiosk {
    let transcript = Transcript::default();
    let scoreboard = Scoreboard::new();
    let requests = Arc::new(Mutex::new(Vec::new()));

    let collab = Collaborators {
        camera: Box::new(ReplayCamera::new(frames)),
        proximity: Box::new(OneItem { presented: false }),
        classifier: Box::new(ScriptedClassifier {
            components: takeout_cup(),
            parts: Mutex::new(parts.into()),
            requests: requests.clone(),
        }),
        announcer: Box::new(transcript.clone()),
        results: Box::new(scoreboard.clone()),
        comments: CommentBook::new(vec!["Nice.".to_string()], vec!["Oops.".to_string()]),
    };
    let scanner = RegionScanner::new(MotionDetector::new(MotionConfig::default()), Duration::ZERO);

    Kiosk {
        controller: SessionController::new(config, bins(), scanner, collab),
        transcript,
        scoreboard,
        requests,
    }
}

fn quick_config() -> ControllerConfig {
    ControllerConfig {
        tracking_window: Duration::from_secs(60),
        poll_interval: Duration::ZERO,
        await_timeout: Duration::ZERO,
        ..ControllerConfig::default()
    }
}

fn verdict(outcome: StepOutcome) -> binwatch::verdict::Verdict {
    match outcome {
        StepOutcome::Verdict(verdict) => verdict,
        other => panic!("expected a verdict, got {:?}", other),
    }
}

// ============================================================================
// Full cycle
// ============================================================================

#[test]
fn test_full_cycle_judges_each_arrival() {
    // Cup goes into compost, then the lid wrongly into recycling.
    let frames = vec![
        scene(&[]),
        scene(&[0]),
        scene(&[0]),
        scene(&[0]),
        scene(&[0, 1]),
        scene(&[0, 1]),
    ];
    let mut kiosk = kiosk(quick_config(), frames, vec!["cup", "Lid."]);

    assert_eq!(kiosk.controller.step(), StepOutcome::Classified { items: 2 });
    assert!(kiosk.controller.state().is_tracking());
    assert_eq!(kiosk.controller.step(), StepOutcome::Baseline);

    let first = verdict(kiosk.controller.step());
    assert_eq!(first.bin_name, "Compost");
    assert_eq!(first.item, "cup");
    assert_eq!(first.correctness, Correctness::Correct);

    assert_eq!(kiosk.controller.step(), StepOutcome::Idle);

    let second = verdict(kiosk.controller.step());
    assert_eq!(second.bin_name, "Recycling");
    assert_eq!(second.item, "lid");
    assert_eq!(second.expected_bin.as_deref(), Some("Garbage"));
    assert_eq!(second.correctness, Correctness::Incorrect);

    // The correctly sorted cup is no longer offered as a candidate
    let requests = kiosk.requests.lock().clone();
    assert_eq!(requests, vec![vec!["Cup".to_string(), "Lid".to_string()], vec!["Lid".to_string()]]);

    let lines = kiosk.transcript.lines.lock().clone();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("Cup goes in Compost"));
    assert!(!lines[0].contains("Box"));

    let summary = kiosk.scoreboard.summary();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.mistakes, 1);
    assert_eq!(
        summary.most_common_mistake,
        Some((("Garbage".to_string(), "Recycling".to_string()), 1))
    );
}

#[test]
fn test_lingering_item_is_judged_once() {
    let frames = vec![scene(&[]), scene(&[2])];
    let mut kiosk = kiosk(quick_config(), frames, vec!["lid"]);

    kiosk.controller.step();
    kiosk.controller.step();
    assert!(verdict(kiosk.controller.step()).is_correct());

    for _ in 0..5 {
        assert_eq!(kiosk.controller.step(), StepOutcome::Idle);
    }
    assert_eq!(kiosk.scoreboard.summary().total, 1);
}

// ============================================================================
// Cycle end
// ============================================================================

#[test]
fn test_expired_window_returns_to_scanning() {
    let config = ControllerConfig {
        tracking_window: Duration::ZERO,
        ..quick_config()
    };
    let mut kiosk = kiosk(config, vec![scene(&[])], vec![]);

    assert_eq!(kiosk.controller.step(), StepOutcome::Classified { items: 2 });
    assert_eq!(kiosk.controller.step(), StepOutcome::Expired);
    assert!(kiosk.controller.state().is_scanning());
    assert!(kiosk.controller.session().is_none());

    // The sensor presents nothing more
    assert_eq!(kiosk.controller.step(), StepOutcome::Idle);
}

#[test]
fn test_end_when_sorted_stops_after_last_item() {
    let config = ControllerConfig {
        end_when_sorted: true,
        ..quick_config()
    };
    let frames = vec![
        scene(&[]),
        scene(&[0]),
        scene(&[0]),
        scene(&[0]),
        scene(&[0, 2]),
        scene(&[0, 2]),
    ];
    let mut kiosk = kiosk(config, frames, vec!["cup", "lid"]);

    kiosk.controller.step();
    kiosk.controller.step();
    assert!(verdict(kiosk.controller.step()).is_correct());
    assert!(kiosk.controller.state().is_tracking());
    assert_eq!(kiosk.controller.step(), StepOutcome::Idle);
    assert!(verdict(kiosk.controller.step()).is_correct());

    assert!(kiosk.controller.state().is_scanning());
    assert_eq!(kiosk.scoreboard.summary().mistakes, 0);
}

#[test]
fn test_nothing_sortable_stays_scanning() {
    let collab = Collaborators {
        camera: Box::new(ReplayCamera::new(vec![scene(&[])])),
        proximity: Box::new(OneItem { presented: false }),
        classifier: Box::new(FixedClassifier::new(vec![Component::new(
            "Box",
            "Cardboard",
            "Recycling",
        )])),
        announcer: Box::new(Transcript::default()),
        results: Box::new(Scoreboard::new()),
        comments: CommentBook::default(),
    };
    let scanner = RegionScanner::new(MotionDetector::new(MotionConfig::default()), Duration::ZERO);
    let mut controller = SessionController::new(quick_config(), bins(), scanner, collab);

    assert_eq!(controller.step(), StepOutcome::NothingRecognised);
    assert!(controller.state().is_scanning());
}

#[test]
fn test_run_returns_immediately_when_already_shut_down() {
    let mut kiosk = kiosk(quick_config(), vec![scene(&[])], vec![]);
    let shutdown = AtomicBool::new(true);

    assert_eq!(kiosk.controller.run(&shutdown), 0);
    assert!(kiosk.controller.state().is_scanning());
}

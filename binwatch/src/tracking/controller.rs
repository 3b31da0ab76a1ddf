//! The SCANNING → TRACKING → SCANNING cycle.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::arrival::BinArrivalTracker;
use super::session::{SessionState, TimeoutPolicy, TrackingSession, DEFAULT_TRACKING_WINDOW};
use crate::announce::{instructions, verdict_message, Announcer, CommentBook};
use crate::camera::{Camera, ProximitySensor};
use crate::classify::Classifier;
use crate::frame::Frame;
use crate::motion::{RegionScanner, ScanOutcome};
use crate::region::RegionSet;
use crate::scoreboard::{ResultLog, ResultRecord};
use crate::verdict::{ExpectedItems, IgnoreList, Verdict, VerdictEngine};

/// Default pause between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Default wait for an item in the scan zone per SCANNING poll.
pub const DEFAULT_AWAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Controller tuning.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub tracking_window: Duration,
    pub poll_interval: Duration,
    pub await_timeout: Duration,
    pub timeout_policy: TimeoutPolicy,
    /// End the cycle as soon as every item has been sorted correctly.
    pub end_when_sorted: bool,
    pub ignore: IgnoreList,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tracking_window: DEFAULT_TRACKING_WINDOW,
            poll_interval: DEFAULT_POLL_INTERVAL,
            await_timeout: DEFAULT_AWAIT_TIMEOUT,
            timeout_policy: TimeoutPolicy::default(),
            end_when_sorted: false,
            ignore: IgnoreList::default(),
        }
    }
}

/// Everything the controller talks to.
pub struct Collaborators {
    pub camera: Box<dyn Camera>,
    pub proximity: Box<dyn ProximitySensor>,
    pub classifier: Box<dyn Classifier>,
    pub announcer: Box<dyn Announcer>,
    pub results: Box<dyn ResultLog>,
    pub comments: CommentBook,
}

/// What a single [`SessionController::step`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing happened this poll.
    Idle,
    /// First TRACKING poll; the frame became the motion baseline.
    Baseline,
    /// Camera capture failed; retried next poll.
    CaptureFailed,
    /// An item was presented but yielded no sortable components.
    NothingRecognised,
    /// An item was classified and tracking began.
    Classified { items: usize },
    /// A region fired again without a new arrival.
    Duplicate { region: usize },
    /// A bin arrival was judged.
    Verdict(Verdict),
    /// The tracking window ran out.
    Expired,
}

/// Owns the session state and every collaborator.
pub struct SessionController {
    config: ControllerConfig,
    regions: RegionSet,
    scanner: RegionScanner,
    engine: VerdictEngine,
    tracker: BinArrivalTracker,
    collab: Collaborators,
    state: SessionState,
    previous: Option<Frame>,
}

impl SessionController {
    pub fn new(
        config: ControllerConfig,
        regions: RegionSet,
        scanner: RegionScanner,
        collab: Collaborators,
    ) -> Self {
        Self {
            config,
            regions,
            scanner,
            engine: VerdictEngine::new(),
            tracker: BinArrivalTracker::new(),
            collab,
            state: SessionState::Scanning,
            previous: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session(&self) -> Option<&TrackingSession> {
        self.state.session()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn regions(&self) -> &RegionSet {
        &self.regions
    }

    /// Poll until `shutdown` is set. Returns the number of polls made.
    ///
    /// A panic inside a poll is logged, the cycle is abandoned and polling
    /// continues.
    pub fn run(&mut self, shutdown: &AtomicBool) -> u64 {
        info!(
            regions = self.regions.len(),
            window_secs = self.config.tracking_window.as_secs(),
            policy = %self.config.timeout_policy,
            "Session controller started"
        );

        let mut polls = 0;
        while !shutdown.load(Ordering::SeqCst) {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| self.step())) {
                error!(
                    state = %self.state,
                    reason = panic_message(payload.as_ref()),
                    "Poll panicked, returning to scanning"
                );
                self.end_tracking();
            }
            polls += 1;
            if !self.config.poll_interval.is_zero() {
                thread::sleep(self.config.poll_interval);
            }
        }

        info!(polls, state = %self.state, "Session controller stopped");
        polls
    }

    /// Run one poll of the current state.
    pub fn step(&mut self) -> StepOutcome {
        if self.state.is_scanning() {
            self.step_scanning()
        } else {
            self.step_tracking()
        }
    }

    fn step_scanning(&mut self) -> StepOutcome {
        let frame = match self
            .collab
            .proximity
            .await_object(self.collab.camera.as_mut(), self.config.await_timeout)
        {
            Ok(Some(frame)) => frame,
            Ok(None) => return StepOutcome::Idle,
            Err(e) => {
                warn!(error = %e, "Waiting for an item failed");
                return StepOutcome::CaptureFailed;
            }
        };

        let components = match self.collab.classifier.classify(&frame) {
            Ok(components) => components,
            Err(e) => {
                warn!(error = %e, "Classification failed");
                return StepOutcome::NothingRecognised;
            }
        };

        let expected = ExpectedItems::from_components(&components, &self.config.ignore);
        if expected.is_empty() {
            debug!(components = components.len(), "No sortable components");
            return StepOutcome::NothingRecognised;
        }

        self.collab.announcer.announce(&instructions(&expected));
        let items = expected.len();
        info!(items, names = ?expected.names(), "Tracking started");

        self.begin_tracking(expected);
        StepOutcome::Classified { items }
    }

    fn step_tracking(&mut self) -> StepOutcome {
        let now = Instant::now();
        let expired = match &self.state {
            SessionState::Tracking(session) => session.is_expired(now),
            SessionState::Scanning => true,
        };
        if expired {
            info!("Tracking window elapsed");
            self.end_tracking();
            return StepOutcome::Expired;
        }

        let current = match self.collab.camera.capture_frame() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Capture failed");
                return StepOutcome::CaptureFailed;
            }
        };

        if current.dimensions() != self.regions.frame_size() {
            let (width, height) = current.dimensions();
            let (expected_width, expected_height) = self.regions.frame_size();
            warn!(
                width,
                height,
                expected_width,
                expected_height,
                "Frame size does not match the configured regions"
            );
            return StepOutcome::CaptureFailed;
        }

        let Some(previous) = self.previous.take() else {
            self.previous = Some(current);
            return StepOutcome::Baseline;
        };

        let ScanOutcome {
            fired,
            masked,
            settled,
        } = self.scanner.scan(
            &current,
            &previous,
            self.regions.as_slice(),
            self.collab.camera.as_mut(),
        );
        // The settled frame already shows the item in place
        self.previous = Some(settled.unwrap_or(current));

        if !self.tracker.observe(fired) {
            return match fired {
                Some(region) => StepOutcome::Duplicate { region },
                None => StepOutcome::Idle,
            };
        }

        let (Some(region_id), Some(masked)) = (fired, masked) else {
            return StepOutcome::Idle;
        };
        let Some(region) = self.regions.get(region_id) else {
            warn!(region = region_id, "Fired region is not configured");
            return StepOutcome::Idle;
        };
        let SessionState::Tracking(session) = &mut self.state else {
            return StepOutcome::Idle;
        };

        let verdict = self.engine.resolve(
            self.collab.classifier.as_ref(),
            region,
            &masked,
            session.expected(),
            &session.candidates(),
        );

        self.collab
            .announcer
            .announce(&verdict_message(&verdict, &self.collab.comments));
        self.collab
            .results
            .log_result(ResultRecord::from_verdict(&verdict, Utc::now()));

        session.record_verdict();
        if verdict.is_correct() {
            session.mark_sorted(&verdict.item);
        }
        if self.config.timeout_policy == TimeoutPolicy::ResetOnFire {
            session.extend_deadline(Instant::now());
        }

        if self.config.end_when_sorted && session.is_complete() {
            info!(verdicts = session.verdicts(), "All items sorted");
            self.end_tracking();
        }

        StepOutcome::Verdict(verdict)
    }

    fn begin_tracking(&mut self, expected: ExpectedItems) {
        self.state = SessionState::Tracking(TrackingSession::begin(
            expected,
            self.config.tracking_window,
            Instant::now(),
        ));
        self.tracker.reset();
        self.previous = None;
    }

    fn end_tracking(&mut self) {
        self.state = SessionState::Scanning;
        self.tracker.reset();
        self.previous = None;
        self.collab.proximity.reset();
        debug!("Session data discarded");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

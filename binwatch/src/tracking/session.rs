//! Session state of the kiosk.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::classify::canonical_name;
use crate::verdict::ExpectedItems;

/// Default length of a tracking cycle.
pub const DEFAULT_TRACKING_WINDOW: Duration = Duration::from_secs(45);

/// How the tracking deadline reacts to verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeoutPolicy {
    /// The deadline is set once when tracking starts.
    #[default]
    FixedWindow,
    /// Every processed verdict pushes the deadline a full window ahead.
    ResetOnFire,
}

impl TimeoutPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeoutPolicy::FixedWindow => "fixed",
            TimeoutPolicy::ResetOnFire => "reset_on_fire",
        }
    }
}

impl fmt::Display for TimeoutPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeoutPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" | "fixed_window" => Ok(TimeoutPolicy::FixedWindow),
            "reset_on_fire" | "reset" => Ok(TimeoutPolicy::ResetOnFire),
            other => Err(format!(
                "unknown timeout policy '{}', expected 'fixed' or 'reset_on_fire'",
                other
            )),
        }
    }
}

/// Data of one tracking cycle.
///
/// Created when an item is classified and dropped when the cycle ends, so
/// nothing leaks from one user to the next.
#[derive(Debug, Clone)]
pub struct TrackingSession {
    expected: ExpectedItems,
    outstanding: Vec<String>,
    window: Duration,
    deadline: Instant,
    verdicts: usize,
}

impl TrackingSession {
    /// Start a cycle at `now`.
    pub fn begin(expected: ExpectedItems, window: Duration, now: Instant) -> Self {
        let outstanding = expected.names();
        Self {
            expected,
            outstanding,
            window,
            deadline: now + window,
            verdicts: 0,
        }
    }

    pub fn expected(&self) -> &ExpectedItems {
        &self.expected
    }

    /// Items not yet sorted correctly, in classification order.
    pub fn outstanding(&self) -> &[String] {
        &self.outstanding
    }

    /// Names offered to part identification.
    ///
    /// Falls back to every expected item once all have been sorted, so a
    /// late arrival can still be named.
    pub fn candidates(&self) -> Vec<String> {
        if self.outstanding.is_empty() {
            self.expected.names()
        } else {
            self.outstanding.clone()
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    /// Push the deadline a full window past `now`.
    pub fn extend_deadline(&mut self, now: Instant) {
        self.deadline = now + self.window;
    }

    /// Remove `item` from the outstanding list. Returns whether it was there.
    pub fn mark_sorted(&mut self, item: &str) -> bool {
        let item = canonical_name(item);
        let before = self.outstanding.len();
        self.outstanding.retain(|name| canonical_name(name) != item);
        self.outstanding.len() != before
    }

    pub fn is_complete(&self) -> bool {
        self.outstanding.is_empty()
    }

    pub fn record_verdict(&mut self) {
        self.verdicts += 1;
    }

    pub fn verdicts(&self) -> usize {
        self.verdicts
    }
}

/// Controller state.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    /// Waiting for an item to classify.
    #[default]
    Scanning,
    /// Watching the bins for the classified item's components.
    Tracking(TrackingSession),
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Scanning => "scanning",
            SessionState::Tracking(_) => "tracking",
        }
    }

    pub fn is_scanning(&self) -> bool {
        matches!(self, SessionState::Scanning)
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self, SessionState::Tracking(_))
    }

    pub fn session(&self) -> Option<&TrackingSession> {
        match self {
            SessionState::Tracking(session) => Some(session),
            SessionState::Scanning => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//! Session tracking.
//!
//! The kiosk alternates between two states:
//!
//! - **Scanning**: wait for an item in the scan zone and classify it.
//! - **Tracking**: watch the bin regions until the tracking window ends,
//!   judging each new bin arrival against the classification.
//!
//! [`SessionController`] drives the cycle; [`BinArrivalTracker`] keeps a
//! lingering fire from producing more than one verdict.

mod arrival;
mod controller;
mod session;

pub use arrival::BinArrivalTracker;
pub use controller::{
    Collaborators, ControllerConfig, SessionController, StepOutcome, DEFAULT_AWAIT_TIMEOUT,
    DEFAULT_POLL_INTERVAL,
};
pub use session::{SessionState, TimeoutPolicy, TrackingSession, DEFAULT_TRACKING_WINDOW};

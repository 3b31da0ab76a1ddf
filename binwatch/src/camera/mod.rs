//! Camera and proximity collaborators.
//!
//! The kiosk core only needs two primitives from the hardware side:
//!
//! - [`Camera::capture_frame`]: grab the current view over the bins.
//! - [`ProximitySensor::await_object`]: block until an item is presented
//!   for classification, or time out.
//!
//! Hardware drivers live outside this crate. The adapters here read frames
//! published by an external capture process, either as a file on disk
//! ([`SnapshotCamera`]) or over HTTP ([`HttpCamera`]), and detect an
//! approaching item by watching a scan zone of the same camera
//! ([`ScanZoneTrigger`]).

mod http;
mod snapshot;
mod trigger;

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::frame::Frame;
use crate::http::HttpError;

pub use http::HttpCamera;
pub use snapshot::SnapshotCamera;
pub use trigger::ScanZoneTrigger;

/// Errors from frame acquisition.
///
/// During tracking these are never fatal: the poll is skipped and retried.
#[derive(Debug, Error)]
pub enum CameraError {
    /// Snapshot file could not be read.
    #[error("failed to read frame from {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Frame bytes are not a decodable image.
    #[error("failed to decode frame: {0}")]
    Decode(#[from] image::ImageError),

    /// Snapshot endpoint could not be reached.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Camera is not available for another reason.
    #[error("camera unavailable: {0}")]
    Unavailable(String),
}

/// Source of frames over the bins.
pub trait Camera: Send {
    /// Capture the current frame.
    fn capture_frame(&mut self) -> Result<Frame, CameraError>;
}

/// Detects an item being presented to the kiosk.
pub trait ProximitySensor: Send {
    /// Wait up to `timeout` for an item and return a frame showing it.
    ///
    /// Returns `Ok(None)` on timeout. The camera is borrowed from the session
    /// controller, which owns it for the life of the process.
    fn await_object(
        &mut self,
        camera: &mut dyn Camera,
        timeout: Duration,
    ) -> Result<Option<Frame>, CameraError>;

    /// Forget any baseline state, e.g. after a tracking cycle changed the scene.
    fn reset(&mut self) {}
}

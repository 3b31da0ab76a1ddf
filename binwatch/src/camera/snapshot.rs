//! File-backed camera.

use std::fs;
use std::path::{Path, PathBuf};

use super::{Camera, CameraError};
use crate::frame::Frame;

/// Reads the latest still written by an external capture process.
///
/// The capture process is expected to replace the file atomically (write
/// to a temporary name, then rename) so a read never sees a partial image.
#[derive(Debug, Clone)]
pub struct SnapshotCamera {
    path: PathBuf,
}

impl SnapshotCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Camera for SnapshotCamera {
    fn capture_frame(&mut self) -> Result<Frame, CameraError> {
        let bytes = fs::read(&self.path).map_err(|source| CameraError::Read {
            path: self.path.clone(),
            source,
        })?;
        Ok(Frame::from_bytes(&bytes)?)
    }
}

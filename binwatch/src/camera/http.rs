//! HTTP snapshot camera.

use super::{Camera, CameraError};
use crate::frame::Frame;
use crate::http::HttpClient;

/// Fetches a still image from a snapshot URL on every capture.
pub struct HttpCamera<H: HttpClient> {
    client: H,
    url: String,
}

impl<H: HttpClient> HttpCamera<H> {
    pub fn new(client: H, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl<H: HttpClient> Camera for HttpCamera<H> {
    fn capture_frame(&mut self) -> Result<Frame, CameraError> {
        let bytes = self.client.get(&self.url)?;
        Ok(Frame::from_bytes(&bytes)?)
    }
}

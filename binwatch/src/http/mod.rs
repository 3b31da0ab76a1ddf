//! HTTP client abstraction for testability
//!
//! The classifier and the snapshot camera both talk HTTP. They depend on the
//! [`HttpClient`] trait so tests can inject canned responses.

use std::time::Duration;

use thiserror::Error;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from HTTP operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpError {
    /// Client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Client(String),

    /// Request could not be sent or timed out.
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// Server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Response body could not be read.
    #[error("failed to read response from {url}: {reason}")]
    Body { url: String, reason: String },
}

/// Trait for HTTP client operations.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request and returns the body.
    fn get(&self, url: &str) -> Result<Vec<u8>, HttpError>;

    /// Performs an HTTP POST with a JSON body and returns the response body.
    ///
    /// `bearer` is sent as an `Authorization: Bearer` header when present.
    fn post_json(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: &serde_json::Value,
    ) -> Result<Vec<u8>, HttpError>;
}

/// Real HTTP client implementation using reqwest.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with the default timeout.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a new ReqwestClient with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(format!("binwatch/{}", crate::VERSION))
            .build()
            .map_err(|e| HttpError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    fn read(url: &str, response: reqwest::blocking::Response) -> Result<Vec<u8>, HttpError> {
        if !response.status().is_success() {
            return Err(HttpError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| HttpError::Body {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        let response = self.client.get(url).send().map_err(|e| HttpError::Request {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        Self::read(url, response)
    }

    fn post_json(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: &serde_json::Value,
    ) -> Result<Vec<u8>, HttpError> {
        let mut request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_string());
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|e| HttpError::Request {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        Self::read(url, response)
    }
}

//! Material classification collaborator.
//!
//! The classification service answers two questions:
//!
//! 1. [`Classifier::classify`]: what components make up the item in this
//!    image, and which disposal category does each belong to?
//! 2. [`Classifier::identify_part`]: which of these candidate components is
//!    visible in this (masked) image?
//!
//! The production implementation is [`OpenAiClassifier`], a vision model
//! behind a chat-completions endpoint. [`FixedClassifier`] answers from a
//! configured list and is used for offline runs.

mod fixed;
mod openai;
mod parse;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::frame::Frame;
use crate::http::HttpError;

pub use fixed::FixedClassifier;
pub use openai::{ClassifierConfig, OpenAiClassifier};
pub use parse::{parse_components, parse_part_name};

/// Name returned by `identify_part` when the item could not be recognised.
pub const UNIDENTIFIED: &str = "unidentified";

/// Errors from the classification service.
#[derive(Debug, Clone, Error)]
pub enum ClassifyError {
    /// Service could not be reached.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Frame could not be encoded for upload.
    #[error("failed to encode image: {0}")]
    Encode(String),

    /// Service answered with something other than the expected format.
    #[error("malformed classifier response: {0}")]
    MalformedResponse(String),

    /// No API key in the configured environment variable.
    #[error("classifier API key not set (expected in ${0})")]
    MissingApiKey(String),
}

/// One component of a classified item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Component name as returned by the service, e.g. "Bottle".
    #[serde(alias = "component", alias = "name")]
    pub component_name: String,

    /// Material description, e.g. "Plastic".
    #[serde(default)]
    pub material: String,

    /// Resin identification code when the service is confident of it.
    #[serde(default, deserialize_with = "parse::lenient_string")]
    pub recycling_number: Option<String>,

    /// Disposal category, which is also the expected bin name.
    #[serde(alias = "category")]
    pub disposable_category: String,
}

impl Component {
    pub fn new(
        component_name: impl Into<String>,
        material: impl Into<String>,
        disposable_category: impl Into<String>,
    ) -> Self {
        Self {
            component_name: component_name.into(),
            material: material.into(),
            recycling_number: None,
            disposable_category: disposable_category.into(),
        }
    }

    pub fn with_recycling_number(mut self, number: impl Into<String>) -> Self {
        self.recycling_number = Some(number.into());
        self
    }
}

/// Classification service used by the session controller.
pub trait Classifier: Send {
    /// Break the item in `frame` into components with disposal categories.
    fn classify(&self, frame: &Frame) -> Result<Vec<Component>, ClassifyError>;

    /// Name which of `candidates` is visible in `frame`.
    ///
    /// Returns one of the candidates or [`UNIDENTIFIED`].
    fn identify_part(&self, frame: &Frame, candidates: &[String]) -> Result<String, ClassifyError>;
}

/// Canonical form of an item or bin name: trimmed, lowercased, without
/// surrounding quotes or a trailing full stop.
pub fn canonical_name(name: &str) -> String {
    name.trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`' || c == '.')
        .trim()
        .to_lowercase()
}

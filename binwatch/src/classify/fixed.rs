//! Offline classifier answering from a fixed component list.

use super::{canonical_name, Classifier, ClassifyError, Component, UNIDENTIFIED};
use crate::frame::Frame;

/// [`Classifier`] that never leaves the machine.
///
/// `classify` always returns the configured components. `identify_part`
/// can only name a part when exactly one candidate is outstanding; anything
/// else is reported as [`UNIDENTIFIED`].
#[derive(Debug, Clone, Default)]
pub struct FixedClassifier {
    components: Vec<Component>,
}

impl FixedClassifier {
    pub fn new(components: Vec<Component>) -> Self {
        Self { components }
    }

    /// A classifier that never recognises anything.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }
}

impl Classifier for FixedClassifier {
    fn classify(&self, _frame: &Frame) -> Result<Vec<Component>, ClassifyError> {
        Ok(self.components.clone())
    }

    fn identify_part(&self, _frame: &Frame, candidates: &[String]) -> Result<String, ClassifyError> {
        Ok(match candidates {
            [only] => canonical_name(only),
            _ => UNIDENTIFIED.to_string(),
        })
    }
}

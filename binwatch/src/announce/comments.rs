//! Encouraging and correcting phrases.

use std::fs;
use std::path::Path;

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::AnnounceError;
use crate::verdict::Correctness;

const DEFAULT_CORRECT: &[&str] = &[
    "Well done!",
    "Great sorting!",
    "That's right!",
    "Perfect, thank you!",
    "Nice job!",
];

const DEFAULT_INCORRECT: &[&str] = &[
    "Oops!",
    "Not quite.",
    "Almost!",
    "Let's try to get that one right next time.",
];

/// Phrases prefixed to verdict announcements.
///
/// Loaded from JSON of the form `{"correct": [...], "incorrect": [...]}`.
/// A missing or empty list falls back to the built-in phrases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentBook {
    #[serde(default)]
    correct: Vec<String>,
    #[serde(default)]
    incorrect: Vec<String>,
}

impl Default for CommentBook {
    fn default() -> Self {
        Self {
            correct: DEFAULT_CORRECT.iter().map(|s| s.to_string()).collect(),
            incorrect: DEFAULT_INCORRECT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl CommentBook {
    pub fn new(correct: Vec<String>, incorrect: Vec<String>) -> Self {
        let defaults = Self::default();
        Self {
            correct: if correct.is_empty() { defaults.correct } else { correct },
            incorrect: if incorrect.is_empty() { defaults.incorrect } else { incorrect },
        }
    }

    pub fn load(path: &Path) -> Result<Self, AnnounceError> {
        let error = |reason: String| AnnounceError::Comments {
            path: path.to_path_buf(),
            reason,
        };
        let text = fs::read_to_string(path).map_err(|e| error(e.to_string()))?;
        let book: CommentBook = serde_json::from_str(&text).map_err(|e| error(e.to_string()))?;
        Ok(Self::new(book.correct, book.incorrect))
    }

    pub fn phrases(&self, correctness: Correctness) -> &[String] {
        match correctness {
            Correctness::Correct => &self.correct,
            Correctness::Incorrect => &self.incorrect,
        }
    }

    /// A random phrase for the given correctness.
    pub fn pick(&self, correctness: Correctness) -> &str {
        self.phrases(correctness)
            .choose(&mut rand::rng())
            .map(String::as_str)
            .unwrap_or_default()
    }
}

//! Result logging and session statistics.
//!
//! Every verdict is handed to a [`ResultLog`]. The built-in [`Scoreboard`]
//! keeps running totals in memory for the end-of-run summary; nothing is
//! persisted.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::verdict::{Correctness, Verdict};

/// One logged sorting attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub timestamp: DateTime<Utc>,
    /// Canonical item name, possibly `unidentified`.
    pub item: String,
    /// Bin the item belongs in, when known.
    pub correct_bin: Option<String>,
    /// Material of the item, when known.
    pub material: Option<String>,
    /// Bin the user chose.
    pub user_bin: String,
    pub correctness: Correctness,
}

impl ResultRecord {
    pub fn from_verdict(verdict: &Verdict, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            item: verdict.item.clone(),
            correct_bin: verdict.expected_bin.clone(),
            material: verdict.material.clone(),
            user_bin: verdict.bin_name.clone(),
            correctness: verdict.correctness,
        }
    }
}

/// Sink for sorting results.
pub trait ResultLog: Send {
    fn log_result(&mut self, record: ResultRecord);
}

/// Snapshot of the scoreboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreSummary {
    pub total: usize,
    pub mistakes: usize,
    pub last: Option<ResultRecord>,
    /// `(correct_bin, user_bin)` of the most frequent mistake and its count.
    pub most_common_mistake: Option<((String, String), usize)>,
}

impl ScoreSummary {
    pub fn correct(&self) -> usize {
        self.total - self.mistakes
    }

    /// Fraction of correct attempts, `None` before the first attempt.
    pub fn accuracy(&self) -> Option<f64> {
        (self.total > 0).then(|| self.correct() as f64 / self.total as f64)
    }
}

impl fmt::Display for ScoreSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(accuracy) = self.accuracy() else {
            return write!(f, "No items sorted");
        };
        write!(
            f,
            "{} sorted, {} correct, {} mistakes ({:.1}% accuracy)",
            self.total,
            self.correct(),
            self.mistakes,
            accuracy * 100.0
        )?;
        if let Some(((correct_bin, user_bin), count)) = &self.most_common_mistake {
            write!(
                f,
                "; most common mistake: {} item in {} ({}x)",
                correct_bin, user_bin, count
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct ScoreState {
    total: usize,
    mistakes: usize,
    last: Option<ResultRecord>,
    mistake_counts: HashMap<(String, String), usize>,
}

/// In-memory [`ResultLog`] with running statistics.
///
/// Clones share the same totals, so the application can keep a handle for
/// the summary after boxing one into the controller.
#[derive(Debug, Clone, Default)]
pub struct Scoreboard {
    state: Arc<Mutex<ScoreState>>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, record: ResultRecord) {
        let mut state = self.state.lock();
        state.total += 1;
        if !record.correctness.is_correct() {
            state.mistakes += 1;
            let key = (
                record
                    .correct_bin
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
                record.user_bin.clone(),
            );
            *state.mistake_counts.entry(key).or_insert(0) += 1;
        }
        state.last = Some(record);
    }

    pub fn summary(&self) -> ScoreSummary {
        let state = self.state.lock();
        // Ties resolve to the lexicographically smallest pair
        let most_common_mistake = state
            .mistake_counts
            .iter()
            .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then_with(|| kb.cmp(ka)))
            .map(|(key, count)| (key.clone(), *count));

        ScoreSummary {
            total: state.total,
            mistakes: state.mistakes,
            last: state.last.clone(),
            most_common_mistake,
        }
    }
}

impl ResultLog for Scoreboard {
    fn log_result(&mut self, record: ResultRecord) {
        self.record(record);
    }
}

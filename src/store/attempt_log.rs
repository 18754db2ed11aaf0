//! Append-only attempt log.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::MasteryResult;
use crate::progress::UpdateOutcome;
use crate::store::AttemptSubmission;
use crate::types::{Difficulty, DominantState};

/// Immutable record of one graded attempt with the belief on either side of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptLogEntry {
    pub learner_id: String,
    pub lesson_id: String,
    pub problem_id: String,
    pub is_correct: bool,
    pub difficulty: Difficulty,
    #[serde(default, alias = "time_to_first_block_ms")]
    pub time_to_first_option_ms: u64,
    pub time_to_completion_ms: u64,
    pub selected_options: Vec<String>,
    pub incorrect_options: Vec<String>,
    pub belief_before: Vec<f64>,
    pub belief_after: Vec<f64>,
    pub state_before: DominantState,
    pub state_after: DominantState,
    pub timestamp: DateTime<Utc>,
}

impl AttemptLogEntry {
    pub fn from_submission(submission: &AttemptSubmission, outcome: &UpdateOutcome) -> Self {
        Self {
            learner_id: submission.learner_id.clone(),
            lesson_id: submission.lesson_id.clone(),
            problem_id: submission.problem_id.clone(),
            is_correct: submission.outcome.is_correct,
            difficulty: submission.outcome.difficulty_attempted,
            time_to_first_option_ms: submission.time_to_first_option_ms,
            time_to_completion_ms: submission.time_to_completion_ms,
            selected_options: submission.selected_options.clone(),
            incorrect_options: submission.incorrect_options.clone(),
            belief_before: outcome.belief_before.clone(),
            belief_after: outcome.belief_after.clone(),
            state_before: outcome.state_before,
            state_after: outcome.state_after,
            timestamp: submission.outcome.timestamp,
        }
    }
}

pub trait AttemptLog: Send + Sync {
    fn append(&self, entry: AttemptLogEntry) -> MasteryResult<()>;

    /// Entries for one learner in append order.
    fn entries_for(&self, learner_id: &str) -> MasteryResult<Vec<AttemptLogEntry>>;
}

#[derive(Debug, Default)]
pub struct InMemoryAttemptLog {
    entries: RwLock<Vec<AttemptLogEntry>>,
}

impl InMemoryAttemptLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl AttemptLog for InMemoryAttemptLog {
    fn append(&self, entry: AttemptLogEntry) -> MasteryResult<()> {
        self.entries.write().push(entry);
        Ok(())
    }

    fn entries_for(&self, learner_id: &str) -> MasteryResult<Vec<AttemptLogEntry>> {
        Ok(self
            .entries
            .read()
            .iter()
            .filter(|e| e.learner_id == learner_id)
            .cloned()
            .collect())
    }
}

//! Misconception tagging.
//!
//! A wrong answer that includes a distractor carrying a reason flags that
//! reason as a misconception for the learner. One open flag is kept per
//! (learner, misconception type, problem).

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::MasteryResult;
use crate::store::content::Problem;
use crate::store::AttemptSubmission;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Misconception {
    pub learner_id: String,
    pub lesson_id: String,
    pub problem_id: String,
    /// Distractor reason, e.g. `sign_error_in_factors`
    pub misconception_type: String,
    pub description: String,
    #[serde(default)]
    pub resolved: bool,
    pub flagged_at: DateTime<Utc>,
}

/// Misconceptions implied by a wrong submission on `problem`.
///
/// Correct submissions, options that are not distractors and distractors
/// without a reason yield nothing.
pub fn detect_misconceptions(
    submission: &AttemptSubmission,
    problem: &Problem,
) -> Vec<Misconception> {
    if submission.outcome.is_correct {
        return Vec::new();
    }

    submission
        .incorrect_options
        .iter()
        .filter_map(|option_id| problem.distractor(option_id))
        .filter_map(|distractor| {
            let reason = distractor.reason.as_deref()?;
            let shown = if distractor.content.is_empty() {
                distractor.option_id.as_str()
            } else {
                distractor.content.as_str()
            };
            Some(Misconception {
                learner_id: submission.learner_id.clone(),
                lesson_id: submission.lesson_id.clone(),
                problem_id: problem.problem_id.clone(),
                misconception_type: reason.to_string(),
                description: format!(
                    "Selected \"{shown}\" which is wrong because: {}",
                    reason.replace('_', " ")
                ),
                resolved: false,
                flagged_at: submission.outcome.timestamp,
            })
        })
        .collect()
}

pub trait MisconceptionLog: Send + Sync {
    /// Store `misconception` unless the same type is already flagged for
    /// this learner and problem. Returns whether it was stored.
    fn record(&self, misconception: Misconception) -> MasteryResult<bool>;

    fn misconceptions_for(&self, learner_id: &str) -> MasteryResult<Vec<Misconception>>;
}

#[derive(Debug, Default)]
pub struct InMemoryMisconceptionLog {
    entries: RwLock<Vec<Misconception>>,
}

impl InMemoryMisconceptionLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MisconceptionLog for InMemoryMisconceptionLog {
    fn record(&self, misconception: Misconception) -> MasteryResult<bool> {
        let mut entries = self.entries.write();
        let duplicate = entries.iter().any(|m| {
            m.learner_id == misconception.learner_id
                && m.problem_id == misconception.problem_id
                && m.misconception_type == misconception.misconception_type
        });
        if duplicate {
            return Ok(false);
        }
        entries.push(misconception);
        Ok(true)
    }

    fn misconceptions_for(&self, learner_id: &str) -> MasteryResult<Vec<Misconception>> {
        Ok(self
            .entries
            .read()
            .iter()
            .filter(|m| m.learner_id == learner_id)
            .cloned()
            .collect())
    }
}

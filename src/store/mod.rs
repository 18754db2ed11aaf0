//! Host-side collaborators
//!
//! The engine itself never performs I/O. This module gives hosts the seams it
//! expects around an update:
//! - a progress store holding one record per (learner, lesson)
//! - an append-only attempt log carrying belief snapshots
//! - a content store mapping difficulty tiers to problem pools
//! - a misconception log fed from tagged distractors
//!
//! In-memory implementations are provided for tests and embedding.

// ============================================================
// Submodules
// ============================================================

pub mod attempt_log;
pub mod content;
pub mod misconception;
pub mod progress_store;

// ============================================================
// Re-exports
// ============================================================

pub use attempt_log::{AttemptLog, AttemptLogEntry, InMemoryAttemptLog};
pub use content::{problem_pool, ContentStore, Distractor, InMemoryContentStore, Lesson, Problem};
pub use misconception::{
    detect_misconceptions, InMemoryMisconceptionLog, Misconception, MisconceptionLog,
};
pub use progress_store::{InMemoryProgressStore, ProgressStore};

use serde::{Deserialize, Serialize};

use crate::config::ModelParams;
use crate::error::MasteryResult;
use crate::progress::{initialize, update, UpdateOutcome};
use crate::types::AttemptOutcome;

/// A graded attempt as reported by the host UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptSubmission {
    pub learner_id: String,
    pub lesson_id: String,
    pub problem_id: String,
    pub outcome: AttemptOutcome,
    /// Problem shown to first option picked
    #[serde(default, alias = "time_to_first_block_ms")]
    pub time_to_first_option_ms: u64,
    #[serde(default)]
    pub time_to_completion_ms: u64,
    #[serde(default)]
    pub selected_options: Vec<String>,
    #[serde(default)]
    pub incorrect_options: Vec<String>,
}

/// The stores a submission touches.
#[derive(Clone, Copy)]
pub struct HostStores<'a> {
    pub progress: &'a dyn ProgressStore,
    pub attempts: &'a dyn AttemptLog,
    pub content: &'a dyn ContentStore,
    pub misconceptions: &'a dyn MisconceptionLog,
}

/// Load-or-initialise, update, flag misconceptions, log, save.
///
/// Callers must not run two submissions for the same (learner, lesson)
/// concurrently; the stores are not locked across the whole sequence.
pub fn submit_attempt(
    params: &ModelParams,
    stores: HostStores<'_>,
    submission: AttemptSubmission,
) -> MasteryResult<UpdateOutcome> {
    let current = match stores
        .progress
        .load(&submission.learner_id, &submission.lesson_id)?
    {
        Some(record) => record,
        None => {
            tracing::debug!(
                learner = %submission.learner_id,
                lesson = %submission.lesson_id,
                "initializing progress record"
            );
            initialize(params)
        }
    };

    let outcome = update(&current, &submission.outcome, params)?;

    if !submission.outcome.is_correct && !submission.incorrect_options.is_empty() {
        match stores.content.problem(&submission.problem_id) {
            Some(problem) => {
                for misconception in detect_misconceptions(&submission, &problem) {
                    let kind = misconception.misconception_type.clone();
                    if stores.misconceptions.record(misconception)? {
                        tracing::info!(
                            learner = %submission.learner_id,
                            problem = %submission.problem_id,
                            misconception = %kind,
                            "misconception flagged"
                        );
                    }
                }
            }
            None => tracing::warn!(
                problem = %submission.problem_id,
                "problem not in content store, skipping misconception tagging"
            ),
        }
    }

    stores
        .attempts
        .append(AttemptLogEntry::from_submission(&submission, &outcome))?;
    if let Err(err) = stores
        .progress
        .save(&submission.learner_id, &submission.lesson_id, &outcome.record)
    {
        tracing::warn!(
            error = %err,
            learner = %submission.learner_id,
            lesson = %submission.lesson_id,
            "failed to save progress record"
        );
        return Err(err);
    }

    Ok(outcome)
}

//! Progress Record lifecycle
//!
//! `initialize` seeds a record the first time a learner opens a lesson and
//! `update` computes the replacement record for each graded attempt. Neither
//! touches storage; the input record is only borrowed.

use serde::{Deserialize, Serialize};

use crate::belief::update_belief;
use crate::config::ModelParams;
use crate::error::MasteryResult;
use crate::policy::{argmax, dominant_state, next_difficulty, state_message};
use crate::types::{
    AttemptOutcome, Difficulty, DominantState, MasteryState, ObservationRecord, ProgressRecord,
    RECENT_OBSERVATION_LIMIT,
};

/// Result of applying one attempt to a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateOutcome {
    pub record: ProgressRecord,
    pub state_before: DominantState,
    pub state_after: DominantState,
    pub belief_before: Vec<f64>,
    pub belief_after: Vec<f64>,
    pub difficulty_changed: bool,
    /// Advisory text for the UI; never feeds back into the record.
    pub message: Option<String>,
}

impl UpdateOutcome {
    pub fn into_record(self) -> ProgressRecord {
        self.record
    }
}

/// Fresh record for a learner's first contact with a lesson.
///
/// The dominant state starts as `practicing` regardless of where the
/// initial distribution peaks.
pub fn initialize(params: &ModelParams) -> ProgressRecord {
    let mastery_confidence = params
        .index_of(MasteryState::Practicing)
        .and_then(|idx| params.initial_distribution.get(idx).copied())
        .unwrap_or(0.0);

    ProgressRecord {
        belief: params.initial_distribution.clone(),
        dominant_state: DominantState::Practicing,
        current_difficulty: Difficulty::Easy,
        mastery_confidence,
        consecutive_at_state: 0,
        recent_observations: Default::default(),
        problems_attempted: 0,
        current_streak: 0,
    }
}

/// Apply one graded attempt to `record`.
pub fn update(
    record: &ProgressRecord,
    outcome: &AttemptOutcome,
    params: &ModelParams,
) -> MasteryResult<UpdateOutcome> {
    let belief_after = update_belief(
        &record.belief,
        outcome.observation(),
        outcome.difficulty_attempted,
        params,
    )?;

    let state_before = record.dominant_state;
    let state_after = dominant_state(
        &belief_after,
        &params.states,
        params.inference.transition_ambiguity_cap,
    );
    let consecutive_at_state = if state_after == state_before {
        record.consecutive_at_state.saturating_add(1)
    } else {
        1
    };
    let confidence = argmax(&belief_after).map(|(_, p)| p).unwrap_or(0.0);

    let current_difficulty = next_difficulty(
        record.current_difficulty,
        state_after,
        confidence,
        consecutive_at_state,
        params,
    );
    let difficulty_changed = current_difficulty != record.current_difficulty;

    let mut recent_observations = record.recent_observations.clone();
    recent_observations.push_back(ObservationRecord {
        correct: outcome.is_correct,
        difficulty: outcome.difficulty_attempted,
        timestamp: outcome.timestamp,
    });
    while recent_observations.len() > RECENT_OBSERVATION_LIMIT {
        recent_observations.pop_front();
    }

    let current_streak = if outcome.is_correct {
        record.current_streak.saturating_add(1)
    } else {
        0
    };

    if state_after != state_before {
        tracing::info!(
            from = %state_before,
            to = %state_after,
            confidence,
            "dominant state changed"
        );
    }
    if difficulty_changed {
        tracing::info!(
            from = %record.current_difficulty,
            to = %current_difficulty,
            consecutive = consecutive_at_state,
            "difficulty changed"
        );
    }

    let new_record = ProgressRecord {
        belief: belief_after.clone(),
        dominant_state: state_after,
        current_difficulty,
        mastery_confidence: confidence,
        consecutive_at_state,
        recent_observations,
        problems_attempted: record.problems_attempted.saturating_add(1),
        current_streak,
    };

    Ok(UpdateOutcome {
        record: new_record,
        state_before,
        state_after,
        belief_before: record.belief.clone(),
        belief_after,
        difficulty_changed,
        message: state_message(state_before, state_after).map(str::to_string),
    })
}

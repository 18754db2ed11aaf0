//! State & Difficulty Policy
//!
//! Summarises a belief vector as a dominant state and decides whether the
//! problem difficulty may follow it. Difficulty only moves when the
//! recommendation differs from the current tier *and* the advance or regress
//! guard passes, so a single noisy answer cannot flip it.

use crate::config::ModelParams;
use crate::types::{
    Difficulty, DominantState, MasteryState, ADVANCE_THRESHOLD_SCALE, REGRESS_CONFIDENCE,
};

/// Index and value of the largest component; ties go to the earliest index.
pub fn argmax(belief: &[f64]) -> Option<(usize, f64)> {
    belief.iter().copied().enumerate().fold(None, |best, (i, p)| match best {
        Some((_, max)) if p <= max => best,
        _ => Some((i, p)),
    })
}

/// Dominant state of `belief`, or `Transition` when the largest component is
/// strictly below `ambiguity_cap`.
pub fn dominant_state(belief: &[f64], states: &[MasteryState], ambiguity_cap: f64) -> DominantState {
    match argmax(belief) {
        Some((idx, max)) if max >= ambiguity_cap => states
            .get(idx)
            .map(|&s| DominantState::from(s))
            .unwrap_or(DominantState::Transition),
        _ => DominantState::Transition,
    }
}

pub fn recommend_difficulty(state: DominantState) -> Option<Difficulty> {
    match state {
        DominantState::Learning => Some(Difficulty::Easy),
        DominantState::Practicing => Some(Difficulty::Moderate),
        DominantState::Mastered => Some(Difficulty::Hard),
        DominantState::Transition => None,
    }
}

pub fn should_advance(confidence: f64, consecutive_count: u32, params: &ModelParams) -> bool {
    confidence >= params.inference.mastery_threshold * ADVANCE_THRESHOLD_SCALE
        && consecutive_count >= params.inference.consecutive_required
}

pub fn should_regress(confidence: f64, consecutive_count: u32, params: &ModelParams) -> bool {
    confidence < REGRESS_CONFIDENCE && consecutive_count >= params.inference.consecutive_required
}

/// Difficulty after an update that landed in `new_state`.
pub fn next_difficulty(
    current: Difficulty,
    new_state: DominantState,
    confidence: f64,
    consecutive_count: u32,
    params: &ModelParams,
) -> Difficulty {
    match recommend_difficulty(new_state) {
        Some(recommended)
            if recommended != current
                && (should_advance(confidence, consecutive_count, params)
                    || should_regress(confidence, consecutive_count, params)) =>
        {
            recommended
        }
        _ => current,
    }
}

/// Encouragement shown when the dominant state changes.
pub fn state_message(old: DominantState, new: DominantState) -> Option<&'static str> {
    use DominantState::*;

    if old == new {
        return None;
    }
    match (old, new) {
        (Learning, Practicing) => Some(
            "You're getting the hang of this. Let's try something a little more challenging!",
        ),
        (Practicing, Mastered) => Some("Excellent work, you've really got this down!"),
        (Learning, Mastered) => Some("Amazing progress, you jumped straight to mastery!"),
        (Mastered, Practicing) => Some("Let's keep practicing to stay sharp."),
        (Practicing, Learning) => Some("Let's slow down a bit and reinforce the fundamentals."),
        (Transition, Learning) => Some("Let's work on building a stronger foundation."),
        (Transition, Practicing) => Some("Good effort, let's keep working on this one a bit more."),
        (Transition, Mastered) => Some("You've shown consistent mastery. Well done!"),
        _ => None,
    }
}

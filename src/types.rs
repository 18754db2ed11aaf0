//! Common Types and Constants
//!
//! Shared data structures used across the belief, policy and progress modules.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ModelParams;
use crate::error::MasteryError;

// ==================== Constants ====================

/// Size of the display/audit window kept on every progress record
pub const RECENT_OBSERVATION_LIMIT: usize = 5;

/// Allowed deviation of a belief vector's sum from 1.0 at the input boundary
pub const BELIEF_SUM_TOLERANCE: f64 = 1e-6;

/// Allowed deviation of a transition matrix row sum from 1.0
pub const ROW_SUM_TOLERANCE: f64 = 1e-6;

/// Scale applied to `mastery_threshold` for the advance guard only
pub const ADVANCE_THRESHOLD_SCALE: f64 = 0.76;

/// Confidence below which the regress guard fires (not derived from `mastery_threshold`)
pub const REGRESS_CONFIDENCE: f64 = 0.4;

// ==================== States ====================

/// Latent knowledge state of a learner on one lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasteryState {
    Learning,
    Practicing,
    Mastered,
}

impl MasteryState {
    /// Reference ordering of the state space.
    pub const ALL: [MasteryState; 3] = [
        MasteryState::Learning,
        MasteryState::Practicing,
        MasteryState::Mastered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Learning => "learning",
            Self::Practicing => "practicing",
            Self::Mastered => "mastered",
        }
    }
}

impl fmt::Display for MasteryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MasteryState {
    type Err = MasteryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "learning" => Ok(Self::Learning),
            "practicing" => Ok(Self::Practicing),
            "mastered" => Ok(Self::Mastered),
            _ => Err(MasteryError::unknown_label("state", s)),
        }
    }
}

/// Label summarising a belief vector. `Transition` means no state is
/// confident enough to be named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DominantState {
    Learning,
    Practicing,
    Mastered,
    Transition,
}

impl DominantState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Learning => "learning",
            Self::Practicing => "practicing",
            Self::Mastered => "mastered",
            Self::Transition => "transition",
        }
    }

    /// The named state, or `None` for `Transition`.
    pub fn mastery_state(&self) -> Option<MasteryState> {
        match self {
            Self::Learning => Some(MasteryState::Learning),
            Self::Practicing => Some(MasteryState::Practicing),
            Self::Mastered => Some(MasteryState::Mastered),
            Self::Transition => None,
        }
    }
}

impl From<MasteryState> for DominantState {
    fn from(state: MasteryState) -> Self {
        match state {
            MasteryState::Learning => Self::Learning,
            MasteryState::Practicing => Self::Practicing,
            MasteryState::Mastered => Self::Mastered,
        }
    }
}

impl fmt::Display for DominantState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DominantState {
    type Err = MasteryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("transition") {
            return Ok(Self::Transition);
        }
        s.parse::<MasteryState>()
            .map(Self::from)
            .map_err(|_| MasteryError::unknown_label("dominant state", s))
    }
}

// ==================== Difficulty & Observation ====================

/// Problem difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum Difficulty {
    #[default]
    Easy,
    Moderate,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Moderate, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Moderate => "moderate",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = MasteryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "moderate" => Ok(Self::Moderate),
            "hard" => Ok(Self::Hard),
            _ => Err(MasteryError::unknown_label("difficulty", s)),
        }
    }
}

/// Graded outcome of a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Observation {
    Correct,
    Incorrect,
}

impl Observation {
    pub fn from_correct(is_correct: bool) -> Self {
        if is_correct {
            Self::Correct
        } else {
            Self::Incorrect
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, Self::Correct)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::Incorrect => "incorrect",
        }
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Observation {
    type Err = MasteryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "correct" => Ok(Self::Correct),
            "incorrect" => Ok(Self::Incorrect),
            _ => Err(MasteryError::unknown_label("observation", s)),
        }
    }
}

// ==================== Attempts & Records ====================

/// Entry in a record's recent-observation window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub correct: bool,
    pub difficulty: Difficulty,
    pub timestamp: DateTime<Utc>,
}

/// Graded attempt handed to [`crate::progress::update`].
///
/// The timestamp is supplied by the host so that replaying the same
/// attempts always yields the same records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptOutcome {
    pub is_correct: bool,
    pub difficulty_attempted: Difficulty,
    pub timestamp: DateTime<Utc>,
}

impl AttemptOutcome {
    pub fn new(is_correct: bool, difficulty_attempted: Difficulty, timestamp: DateTime<Utc>) -> Self {
        Self {
            is_correct,
            difficulty_attempted,
            timestamp,
        }
    }

    pub fn observation(&self) -> Observation {
        Observation::from_correct(self.is_correct)
    }
}

/// Mastery state of one learner on one lesson.
///
/// Owned by the host's progress store; this crate only computes replacements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    #[serde(alias = "hmm_belief")]
    pub belief: Vec<f64>,
    pub dominant_state: DominantState,
    pub current_difficulty: Difficulty,
    pub mastery_confidence: f64,
    pub consecutive_at_state: u32,
    #[serde(default)]
    pub recent_observations: VecDeque<ObservationRecord>,
    #[serde(default)]
    pub problems_attempted: u32,
    #[serde(default)]
    pub current_streak: u32,
}

impl ProgressRecord {
    /// Fraction of correct answers in the recent window, `None` when empty.
    pub fn recent_accuracy(&self) -> Option<f64> {
        if self.recent_observations.is_empty() {
            return None;
        }
        let correct = self.recent_observations.iter().filter(|o| o.correct).count();
        Some(correct as f64 / self.recent_observations.len() as f64)
    }

    /// Belief mass on `state` under the state ordering of `params`.
    pub fn belief_for(&self, state: MasteryState, params: &ModelParams) -> Option<f64> {
        params
            .index_of(state)
            .and_then(|idx| self.belief.get(idx).copied())
    }
}

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MasteryError, MasteryResult};
use crate::sanitize::{check_belief, check_stochastic_matrix, check_unit_interval};
use crate::types::{Difficulty, MasteryState};

/// Environment variable naming a model-export JSON file.
pub const MODEL_PATH_ENV: &str = "MASTERY_MODEL_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyMultiplier {
    pub easy: f64,
    pub moderate: f64,
    pub hard: f64,
}

impl Default for DifficultyMultiplier {
    fn default() -> Self {
        Self {
            easy: 1.0,
            moderate: 0.9,
            hard: 0.75,
        }
    }
}

impl DifficultyMultiplier {
    pub fn get(&self, difficulty: Difficulty) -> f64 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Moderate => self.moderate,
            Difficulty::Hard => self.hard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceParams {
    /// P(incorrect | mastered)
    pub slip: f64,
    /// P(correct | not known)
    pub guess: f64,
    pub mastery_threshold: f64,
    pub consecutive_required: u32,
    pub transition_ambiguity_cap: f64,
}

impl Default for InferenceParams {
    fn default() -> Self {
        Self {
            slip: 0.10,
            guess: 0.25,
            mastery_threshold: 0.65,
            consecutive_required: 2,
            transition_ambiguity_cap: 0.5,
        }
    }
}

/// Static description of the hidden-Markov mastery model.
///
/// `base_mastery` and the rows/columns of `transition_matrix` are aligned
/// with `states`, which is always learning, practicing, mastered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ModelExport", into = "ModelExport")]
pub struct ModelParams {
    pub states: Vec<MasteryState>,
    pub initial_distribution: Vec<f64>,
    pub transition_matrix: Vec<Vec<f64>>,
    pub base_mastery: Vec<f64>,
    pub difficulty_multiplier: DifficultyMultiplier,
    pub inference: InferenceParams,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            states: MasteryState::ALL.to_vec(),
            initial_distribution: vec![0.2, 0.6, 0.2],
            // mastered is absorbing
            transition_matrix: vec![
                vec![0.75, 0.25, 0.0],
                vec![0.0, 0.80, 0.20],
                vec![0.0, 0.0, 1.0],
            ],
            base_mastery: vec![0.35, 0.60, 0.90],
            difficulty_multiplier: DifficultyMultiplier::default(),
            inference: InferenceParams::default(),
        }
    }
}

impl ModelParams {
    pub fn index_of(&self, state: MasteryState) -> Option<usize> {
        self.states.iter().position(|&s| s == state)
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Check shape, ranges and orderings of every parameter.
    ///
    /// `states` must be exactly learning, practicing, mastered in that order;
    /// `base_mastery` must be non-decreasing and the difficulty multipliers
    /// non-increasing along their tiers.
    pub fn validate(&self) -> MasteryResult<()> {
        let n = self.states.len();
        if self.states.as_slice() != MasteryState::ALL.as_slice() {
            return Err(MasteryError::Config(format!(
                "states must be [learning, practicing, mastered] in that order, got {:?}",
                self.states.iter().map(MasteryState::as_str).collect::<Vec<_>>()
            )));
        }

        check_belief(&self.initial_distribution, n).map_err(|e| {
            MasteryError::Config(format!("initial_distribution: {e}"))
        })?;
        check_stochastic_matrix(&self.transition_matrix, n)?;

        if self.base_mastery.len() != n {
            return Err(MasteryError::Config(format!(
                "base_mastery must have {n} entries, got {}",
                self.base_mastery.len()
            )));
        }
        for (state, &m) in self.states.iter().zip(&self.base_mastery) {
            check_unit_interval(m, &format!("base_mastery[{state}]"))?;
        }
        if let Some(w) = self.base_mastery.windows(2).position(|w| w[1] < w[0]) {
            return Err(MasteryError::Config(format!(
                "base_mastery must be non-decreasing along states, but {} ({}) < {} ({})",
                self.states[w + 1],
                self.base_mastery[w + 1],
                self.states[w],
                self.base_mastery[w]
            )));
        }

        for difficulty in Difficulty::ALL {
            let m = self.difficulty_multiplier.get(difficulty);
            if !(m > 0.0 && m <= 1.0) {
                return Err(MasteryError::Config(format!(
                    "difficulty_multiplier[{difficulty}] must be in (0, 1], got {m}"
                )));
            }
        }
        for pair in Difficulty::ALL.windows(2) {
            let (easier, harder) = (pair[0], pair[1]);
            let (a, b) = (
                self.difficulty_multiplier.get(easier),
                self.difficulty_multiplier.get(harder),
            );
            if b > a {
                return Err(MasteryError::Config(format!(
                    "difficulty_multiplier must not increase with difficulty, but {harder} ({b}) > {easier} ({a})"
                )));
            }
        }

        let inf = &self.inference;
        check_unit_interval(inf.slip, "slip")?;
        check_unit_interval(inf.guess, "guess")?;
        check_unit_interval(inf.mastery_threshold, "mastery_threshold")?;
        check_unit_interval(inf.transition_ambiguity_cap, "transition_ambiguity_cap")?;
        if inf.consecutive_required == 0 {
            return Err(MasteryError::Config(
                "consecutive_required must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    pub fn from_json_str(json: &str) -> MasteryResult<Self> {
        let export: ModelExport = serde_json::from_str(json)?;
        Self::try_from(export)
    }

    pub fn from_path(path: impl AsRef<Path>) -> MasteryResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let params = Self::from_json_str(&raw)?;
        tracing::info!(path = %path.display(), "mastery model loaded");
        Ok(params)
    }

    /// Load from `MASTERY_MODEL_PATH`, or the reference model when unset.
    pub fn from_env() -> MasteryResult<Self> {
        match std::env::var(MODEL_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_path(path.trim()),
            _ => Ok(Self::default()),
        }
    }
}

/// Wire layout of a model export: `base_mastery` keyed by state name and the
/// scalar parameters grouped under `inference_params`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModelExport {
    states: Vec<MasteryState>,
    initial_distribution: Vec<f64>,
    transition_matrix: Vec<Vec<f64>>,
    base_mastery: BTreeMap<MasteryState, f64>,
    difficulty_multiplier: DifficultyMultiplier,
    inference_params: InferenceParams,
}

impl TryFrom<ModelExport> for ModelParams {
    type Error = MasteryError;

    fn try_from(export: ModelExport) -> Result<Self, Self::Error> {
        if let Some(extra) = export
            .base_mastery
            .keys()
            .find(|state| !export.states.contains(state))
        {
            return Err(MasteryError::Config(format!(
                "base_mastery has entry for {extra}, which is not in states"
            )));
        }
        let base_mastery = export
            .states
            .iter()
            .map(|state| {
                export.base_mastery.get(state).copied().ok_or_else(|| {
                    MasteryError::Config(format!("base_mastery missing entry for {state}"))
                })
            })
            .collect::<MasteryResult<Vec<_>>>()?;

        let params = ModelParams {
            states: export.states,
            initial_distribution: export.initial_distribution,
            transition_matrix: export.transition_matrix,
            base_mastery,
            difficulty_multiplier: export.difficulty_multiplier,
            inference: export.inference_params,
        };
        params.validate()?;
        Ok(params)
    }
}

impl From<ModelParams> for ModelExport {
    fn from(params: ModelParams) -> Self {
        let base_mastery = params
            .states
            .iter()
            .copied()
            .zip(params.base_mastery.iter().copied())
            .collect();
        Self {
            states: params.states,
            initial_distribution: params.initial_distribution,
            transition_matrix: params.transition_matrix,
            base_mastery,
            difficulty_multiplier: params.difficulty_multiplier,
            inference_params: params.inference,
        }
    }
}

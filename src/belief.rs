//! Belief Update - single forward-algorithm step over the mastery states
//!
//! For each state i:
//!   p_correct_i = (base_mastery_i * (1 - slip) + (1 - base_mastery_i) * guess) * multiplier[difficulty]
//!   emission_i  = p_correct_i if correct, else 1 - p_correct_i
//!   prior_i     = sum_j belief_j * transition[j][i]
//!   belief'_i   = emission_i * prior_i / sum_k (emission_k * prior_k)
//!
//! A zero normaliser returns the input belief unchanged.

use crate::config::ModelParams;
use crate::error::MasteryResult;
use crate::sanitize::{check_belief, check_stochastic_matrix};
use crate::types::{Difficulty, Observation};

/// P(observation | state) for a state with the given base mastery.
pub fn emission_probability(
    base_mastery: f64,
    observation: Observation,
    difficulty: Difficulty,
    params: &ModelParams,
) -> f64 {
    let slip = params.inference.slip;
    let guess = params.inference.guess;
    let p_correct = (base_mastery * (1.0 - slip) + (1.0 - base_mastery) * guess)
        * params.difficulty_multiplier.get(difficulty);
    match observation {
        Observation::Correct => p_correct,
        Observation::Incorrect => 1.0 - p_correct,
    }
}

/// Project a belief one step forward through the transition matrix.
///
/// The matrix must be row-stochastic and square in the belief's length.
pub fn project_prior(belief: &[f64], transition_matrix: &[Vec<f64>]) -> MasteryResult<Vec<f64>> {
    check_stochastic_matrix(transition_matrix, belief.len())?;
    Ok((0..belief.len())
        .map(|i| {
            belief
                .iter()
                .zip(transition_matrix)
                .map(|(b, row)| b * row[i])
                .sum::<f64>()
        })
        .collect())
}

/// Posterior belief after observing `observation` on a problem of `difficulty`.
///
/// Fails if `params` does not validate or `belief` is not a probability
/// vector over `params.states`.
pub fn update_belief(
    belief: &[f64],
    observation: Observation,
    difficulty: Difficulty,
    params: &ModelParams,
) -> MasteryResult<Vec<f64>> {
    params.validate()?;
    check_belief(belief, params.num_states())?;

    let prior = project_prior(belief, &params.transition_matrix)?;
    let unnormalized: Vec<f64> = params
        .base_mastery
        .iter()
        .zip(&prior)
        .map(|(&m, &p)| emission_probability(m, observation, difficulty, params) * p)
        .collect();

    let norm: f64 = unnormalized.iter().sum();
    if norm == 0.0 {
        tracing::warn!(
            %observation,
            %difficulty,
            "belief update normaliser is zero, keeping prior belief"
        );
        return Ok(belief.to_vec());
    }

    let posterior: Vec<f64> = unnormalized.into_iter().map(|x| x / norm).collect();
    tracing::debug!(%observation, %difficulty, ?posterior, "belief updated");
    Ok(posterior)
}

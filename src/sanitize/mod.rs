//! Input Validation
//!
//! Numerical checks shared by model-parameter validation and the belief
//! update boundary.
//!
//! Functions:
//! - Invalid value detection (NaN / Inf)
//! - Probability vector validation
//! - Row-stochastic matrix validation

use crate::error::{MasteryError, MasteryResult};
use crate::types::{BELIEF_SUM_TOLERANCE, ROW_SUM_TOLERANCE};

/// Whether the slice contains NaN or infinite values
pub fn has_invalid_values(arr: &[f64]) -> bool {
    arr.iter().any(|&x| x.is_nan() || x.is_infinite())
}

/// Check a value lies in [0, 1]
pub fn check_unit_interval(value: f64, name: &str) -> MasteryResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(MasteryError::Config(format!(
            "{name} must be in [0, 1], got {value}"
        )));
    }
    Ok(())
}

/// Check a belief vector: expected length, finite non-negative components,
/// sum within [`BELIEF_SUM_TOLERANCE`] of 1.
pub fn check_belief(belief: &[f64], expected_len: usize) -> MasteryResult<()> {
    if belief.len() != expected_len {
        return Err(MasteryError::DimensionMismatch {
            expected: expected_len,
            actual: belief.len(),
        });
    }
    if has_invalid_values(belief) {
        return Err(MasteryError::InvalidBelief(format!(
            "belief contains NaN or infinite values: {belief:?}"
        )));
    }
    if let Some(neg) = belief.iter().find(|&&p| p < 0.0) {
        return Err(MasteryError::InvalidBelief(format!(
            "belief contains negative component {neg}"
        )));
    }
    let sum: f64 = belief.iter().sum();
    if (sum - 1.0).abs() > BELIEF_SUM_TOLERANCE {
        return Err(MasteryError::InvalidBelief(format!(
            "belief must sum to 1, got {sum}"
        )));
    }
    Ok(())
}

/// Check an `n x n` row-stochastic matrix
pub fn check_stochastic_matrix(matrix: &[Vec<f64>], n: usize) -> MasteryResult<()> {
    if matrix.len() != n {
        return Err(MasteryError::Config(format!(
            "transition_matrix must have {n} rows, got {}",
            matrix.len()
        )));
    }
    for (i, row) in matrix.iter().enumerate() {
        if row.len() != n {
            return Err(MasteryError::Config(format!(
                "transition_matrix row {i} must have {n} columns, got {}",
                row.len()
            )));
        }
        if has_invalid_values(row) || row.iter().any(|&p| !(0.0..=1.0).contains(&p)) {
            return Err(MasteryError::Config(format!(
                "transition_matrix row {i} has entries outside [0, 1]: {row:?}"
            )));
        }
        let sum: f64 = row.iter().sum();
        if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
            return Err(MasteryError::Config(format!(
                "transition_matrix row {i} must sum to 1, got {sum}"
            )));
        }
    }
    Ok(())
}

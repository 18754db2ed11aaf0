use thiserror::Error;

/// Errors raised at the boundary of the mastery engine.
///
/// Everything here is a configuration or caller error. The zero-normalisation
/// case of a belief update is handled in place and never surfaces as an error.
#[derive(Debug, Error)]
pub enum MasteryError {
    /// Belief vector is not a probability distribution.
    #[error("invalid belief: {0}")]
    InvalidBelief(String),

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Label outside the closed set for its kind.
    #[error("unknown {kind} label: {value:?}")]
    UnknownLabel { kind: &'static str, value: String },

    /// Model parameters failed validation.
    #[error("config error: {0}")]
    Config(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl MasteryError {
    pub(crate) fn unknown_label(kind: &'static str, value: &str) -> Self {
        Self::UnknownLabel {
            kind,
            value: value.to_string(),
        }
    }
}

pub type MasteryResult<T> = Result<T, MasteryError>;

//! # mastery-hmm - adaptive mastery tracking
//!
//! Maintains a probability distribution over a learner's latent knowledge
//! state (`learning`, `practicing`, `mastered`) from a stream of right/wrong
//! answers, and uses it to pick the difficulty of the next problem.
//!
//! The engine is a pure state-transition core: given the previous progress
//! record and a graded attempt it computes the next record. Storage, content
//! catalogs and UI stay with the host, which talks to the engine through the
//! seams in [`store`].
//!
//! ## Modules
//!
//! - [`config`] - model parameters, model-export loading and validation
//! - [`belief`] - forward-algorithm belief update
//! - [`policy`] - dominant state, difficulty recommendation, hysteresis guards
//! - [`progress`] - record initialisation and per-attempt update
//! - [`store`] - progress store, attempt log, content store and misconception seams
//! - [`sanitize`] - probability vector / matrix validation
//! - [`logging`] - tracing subscriber set-up for hosts
//! - [`types`] - shared types and constants
//!
//! ## Example
//!
//! ```rust
//! use chrono::Utc;
//! use mastery_hmm::{initialize, update, AttemptOutcome, Difficulty, ModelParams};
//!
//! let params = ModelParams::default();
//! let record = initialize(&params);
//!
//! let attempt = AttemptOutcome::new(true, record.current_difficulty, Utc::now());
//! let outcome = update(&record, &attempt, &params).unwrap();
//!
//! assert_eq!(outcome.record.problems_attempted, 1);
//! assert_eq!(outcome.record.current_difficulty, Difficulty::Easy);
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod belief;
pub mod config;
pub mod error;
pub mod logging;
pub mod policy;
pub mod progress;
pub mod sanitize;
pub mod store;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use types::*;

pub use belief::{emission_probability, project_prior, update_belief};
pub use config::{DifficultyMultiplier, InferenceParams, ModelParams};
pub use error::{MasteryError, MasteryResult};
pub use policy::{
    dominant_state, next_difficulty, recommend_difficulty, should_advance, should_regress,
    state_message,
};
pub use progress::{initialize, update, UpdateOutcome};
pub use store::{
    detect_misconceptions, problem_pool, submit_attempt, AttemptLog, AttemptLogEntry,
    AttemptSubmission, ContentStore, Distractor, HostStores, InMemoryAttemptLog,
    InMemoryContentStore, InMemoryMisconceptionLog, InMemoryProgressStore, Lesson, Misconception,
    MisconceptionLog, Problem, ProgressStore,
};

//! Replay a sequence of graded attempts from a fresh record.
//!
//! Usage: mastery-replay <attempts.json> [model.json]
//!
//! `attempts.json` is an array of `{"is_correct", "difficulty"?, "timestamp"}`
//! objects. A missing difficulty means the attempt was served at the record's
//! current difficulty. Each resulting record is printed as one JSON line.

use std::io::Write;
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use mastery_hmm::logging::init_tracing;
use mastery_hmm::{initialize, update, AttemptOutcome, Difficulty, MasteryError, MasteryResult, ModelParams};

#[derive(Debug, Deserialize)]
struct ReplayAttempt {
    is_correct: bool,
    #[serde(default, alias = "difficulty_attempted")]
    difficulty: Option<Difficulty>,
    timestamp: DateTime<Utc>,
}

fn run(attempts_path: &str, model_path: Option<&str>) -> MasteryResult<()> {
    let params = match model_path {
        Some(path) => ModelParams::from_path(path)?,
        None => ModelParams::from_env()?,
    };

    let raw = std::fs::read_to_string(attempts_path)?;
    let attempts: Vec<ReplayAttempt> = serde_json::from_str(&raw)?;
    tracing::info!(count = attempts.len(), path = attempts_path, "replaying attempts");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut record = initialize(&params);
    for attempt in attempts {
        let difficulty = attempt.difficulty.unwrap_or(record.current_difficulty);
        let outcome = update(
            &record,
            &AttemptOutcome::new(attempt.is_correct, difficulty, attempt.timestamp),
            &params,
        )?;
        if let Some(message) = &outcome.message {
            tracing::info!(%message, state = %outcome.state_after, "state message");
        }
        record = outcome.into_record();
        serde_json::to_writer(&mut out, &record)?;
        writeln!(out)?;
    }

    Ok(())
}

fn main() -> ExitCode {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    let _guard = init_tracing(&log_level);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(attempts_path) = args.first() else {
        eprintln!("usage: mastery-replay <attempts.json> [model.json]");
        return ExitCode::from(2);
    };

    match run(attempts_path, args.get(1).map(String::as_str)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "replay failed");
            eprintln!("mastery-replay: {err}");
            if matches!(err, MasteryError::Config(_) | MasteryError::Json(_)) {
                ExitCode::from(3)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

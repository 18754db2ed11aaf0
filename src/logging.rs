//! Tracing subscriber set-up for hosts and the replay binary.
//!
//! Console output goes to stderr so stdout stays free for record output.
//! File output is opt-in:
//! - `MASTERY_FILE_LOGS=true` (or `1`) adds a daily-rolling `mastery.log`
//! - `MASTERY_LOG_DIR` picks its directory (default `./logs`)

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Keeps the non-blocking file writer alive; drop it to flush.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

/// Whether `MASTERY_FILE_LOGS` asks for the rolling file layer.
pub fn file_logging_enabled() -> bool {
    std::env::var("MASTERY_FILE_LOGS")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}

/// Install the global subscriber.
///
/// Returns the file guard when file logging is on. A subscriber that is
/// already installed (by the host or an earlier call) is left in place.
pub fn init_tracing(log_level: &str) -> Option<FileLogGuard> {
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(true).with_writer(std::io::stderr);

    if file_logging_enabled() {
        let log_dir = std::env::var("MASTERY_LOG_DIR").unwrap_or_else(|_| "./logs".to_string());
        if let Err(err) = std::fs::create_dir_all(&log_dir) {
            eprintln!("failed to create log directory {log_dir}: {err}");
        } else {
            let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "mastery.log");
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            let file_layer = fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(true);

            let installed = tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .with(file_layer)
                .try_init()
                .is_ok();

            return installed.then_some(FileLogGuard { _guard: guard });
        }
    }

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .try_init();

    None
}

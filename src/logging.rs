//! Tracing subscriber setup for the collector binary.

use std::{env, sync::OnceLock};

use tracing_appender::{
    non_blocking,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    EnvFilter,
    fmt::{fmt, time::ChronoLocal, writer::MakeWriterExt},
};

/// Keeps the non-blocking file writer alive so buffered logs flush on exit.
static LOG_GUARD: OnceLock<non_blocking::WorkerGuard> = OnceLock::new();

/// Initializes the global subscriber: stdout always, plus a daily rolling
/// file when `LOG_DIR` is set. `RUST_LOG` controls filtering, defaulting to
/// `info`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt()
        .with_env_filter(filter)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(false);

    match env::var("LOG_DIR") {
        Ok(dir) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("lol-analytics.log")
                .build(&dir)
                .expect("failed to create log file");
            let (file_writer, guard) = non_blocking(appender);
            LOG_GUARD.set(guard).expect("LOG_GUARD already set");

            let stdout = std::io::stdout.with_max_level(tracing::Level::INFO);
            builder.with_writer(stdout.and(file_writer)).init();
        }
        Err(_) => builder.init(),
    }

    tracing::info!("logger initialized");
}

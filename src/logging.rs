//! Tracing subscriber setup.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

/// Build the filter: `RUST_LOG` wins over the configured level.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber.
///
/// Logs go to stderr, plus a daily rolling file when enabled. Keep the
/// returned guard alive until exit so buffered file output is flushed.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    if !config.file_enabled {
        tracing_subscriber::registry()
            .with(env_filter(&config.level))
            .with(stderr_layer)
            .init();
        return None;
    }

    let dir = config.log_dir();
    let appender = tracing_appender::rolling::daily(&dir, "iceplant-attendance.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(stderr_layer)
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .init();

    tracing::info!("Writing logs to {:?}", dir);
    Some(guard)
}


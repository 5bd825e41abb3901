//! Logging setup
//!
//! stderr always; a daily-rolling file in `log.dir` when configured.

use crate::config::LogConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_ENV_VAR: &str = "GOBLEAN_LOG";
pub const LOG_FILE_PREFIX: &str = "goblean.log";

/// Initialize logging.
///
/// Returns a guard that must be held for the lifetime of the process so the
/// file writer is flushed. `None` when logging only to stderr.
pub fn init_logging(config: &LogConfig) -> Option<WorkerGuard> {
    let filter = build_filter(config);

    let (file_layer, guard) = match &config.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).ok();
            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer().with_writer(non_blocking).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();

    if result.is_ok() {
        tracing::debug!(dir = ?config.dir, "logging initialized");
    }

    guard
}

/// `GOBLEAN_LOG` when set and valid, otherwise the configured level
pub fn build_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| {
        EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

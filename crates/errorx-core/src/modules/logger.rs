//! Tracing subscriber setup: stdout plus a daily rolling file.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE_PREFIX: &str = "errorx.log";

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `default_level`. When `log_dir` is given, a
/// non-blocking daily file layer is added and its guard returned; keep it
/// alive for the life of the process or buffered lines are lost.
pub fn init_logger(log_dir: Option<&Path>, default_level: &str) -> Result<Option<WorkerGuard>, String> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| format!("Invalid log filter: {}", e))?;

    let stdout_layer = fmt::layer().with_target(false);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .map_err(|e| format!("Failed to create log directory: {}", e))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| format!("Logger already initialized: {}", e))?;

    Ok(guard)
}

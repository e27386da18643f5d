//! Logging configuration using tracing

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

const LOG_FILENAME: &str = "fperf.log";

/// Filter used when `FPERF_LOG` is unset. `fperf` is the binary target.
const DEFAULT_FILTER: &str = "fperf=info,fperf_app=info,warn";

/// Initialize the logging subsystem
///
/// Logs are written to `~/.local/share/flutter-perf/logs/` so that report
/// output on stdout stays clean.
/// Log level is controlled by `FPERF_LOG` environment variable.
///
/// # Examples
/// ```bash
/// FPERF_LOG=debug fperf events.ndjson
/// FPERF_LOG=fperf_app=trace fperf events.ndjson
/// ```
pub fn init() -> Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILENAME);

    // Default to info, allow override via FPERF_LOG
    let env_filter = EnvFilter::try_from_env("FPERF_LOG")
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!("Flutter Perf starting");
    tracing::info!("Log directory: {}", log_dir.display());

    Ok(())
}

/// Get the log directory path
fn get_log_directory() -> Result<PathBuf> {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    Ok(base.join("flutter-perf").join("logs"))
}

/// Get the log file path for the current day
pub fn get_current_log_file() -> Result<PathBuf> {
    let dir = get_log_directory()?;
    Ok(dir.join(LOG_FILENAME))
}

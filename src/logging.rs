use std::fs;
use std::io;
use std::path::Path;

use time::macros::format_description;
use time::UtcOffset;
use tracing_subscriber::{self, fmt, prelude::*};
use tracing_appender::non_blocking::WorkerGuard;

/// Initialize logger with stderr output and an optional log file
///
/// Returns the file writer's guard, which must be kept alive for the duration of the program so that
/// buffered lines are flushed on exit.
///
/// # Arguments
/// * `no_color` - Disable ANSI colors in stderr output
/// * `log_level` - Override log level (otherwise uses RUST_LOG or defaults to "info")
/// * `log_file` - Also log to this file, appending, at DEBUG level
///
/// # Logging Behavior
/// - **Stderr**: Logs at the configured level (default "info"): one line per converted or failed file,
///   one warning per call site left unconverted
/// - **File**: Logs at DEBUG level, including every converted call site
pub fn init_logger(no_color: bool, log_level: Option<&str>, log_file: Option<&Path>) -> io::Result<Option<WorkerGuard>> {
    let timer = fmt::time::OffsetTime::new(
        UtcOffset::UTC,
        format_description!("[[[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z]"),
    );

    let stderr_filter = match log_level {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(timer.clone())
        .with_ansi(!no_color)
        .with_filter(stderr_filter);

    match log_file {
        Some(log_path) => {
            if let Some(parent) = log_path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?;

            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let file_layer = fmt::layer()
                .with_writer(non_blocking)
                .with_timer(timer)
                .with_ansi(false)
                .with_filter(tracing_subscriber::EnvFilter::new("debug"));

            // Each layer has its own filter, so no global filter needed
            let result = tracing_subscriber::registry()
                .with(stderr_layer)
                .with(file_layer)
                .try_init();
            tolerate_already_set(result).map(|()| Some(guard))
        }
        None => {
            let result = tracing_subscriber::registry()
                .with(stderr_layer)
                .try_init();
            tolerate_already_set(result).map(|()| None)
        }
    }
}

/// Ignore errors due to the subscriber or logger already being set (repeated initialisation in tests).
fn tolerate_already_set(result: Result<(), tracing_subscriber::util::TryInitError>) -> io::Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.to_string().contains("already been set") || e.to_string().contains("SetLoggerError") => Ok(()),
        Err(e) => Err(io::Error::other(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_initialisation_is_tolerated() {
        let dir = tempfile::tempdir().expect("temp dir");
        let log_path = dir.path().join("logs").join("run.log");
        let first = init_logger(true, Some("warn"), Some(&log_path));
        assert!(first.is_ok());
        assert!(log_path.exists());
        assert!(init_logger(true, Some("debug"), None).is_ok());
    }
}

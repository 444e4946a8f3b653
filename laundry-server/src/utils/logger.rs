//! Logging Infrastructure
//!
//! Structured logging for development and production. `RUST_LOG` wins over
//! the configured level when set.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "laundry-server";

/// Initialize the logger with the default level and stdout only
pub fn init_logger() -> Option<WorkerGuard> {
    init_logger_with_file(None, None)
}

/// Initialize the logger with optional daily-rolling file output
///
/// The returned guard must be held for the lifetime of the process, dropping
/// it flushes and stops the file writer.
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) -> Option<WorkerGuard> {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists()
            && let Some(dir_str) = log_path.to_str()
        {
            let file_appender = tracing_appender::rolling::daily(dir_str, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            // file output is JSON lines; try_init: tests may install a subscriber more than once
            let _ = subscriber
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .try_init();
            return Some(guard);
        }
        eprintln!("LOG_DIR {} does not exist, logging to stdout only", dir);
    }

    let _ = subscriber.try_init();
    None
}

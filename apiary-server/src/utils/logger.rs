//! Logging Infrastructure
//!
//! Structured logging with an env-driven filter and optional daily-rolling file output.

use std::path::Path;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "apiary_server=info,security=info,tower_http=info";

/// Initialize the logger with defaults (stdout only)
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize the logger with optional file output
///
/// `RUST_LOG` wins over `log_level`; `log_level` is applied to this crate and
/// tower-http. Security events (target `security`) are always kept at info.
/// When `log_dir` exists, logs go to a daily-rolling file `apiary-server.YYYY-MM-DD`.
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match log_level {
        Some(level) => EnvFilter::new(format!("apiary_server={level},security=info,tower_http={level}")),
        None => EnvFilter::new(DEFAULT_FILTER),
    });

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
            let file_appender = tracing_appender::rolling::daily(dir_str, "apiary-server");
            // try_init: tests may install a subscriber more than once
            let _ = subscriber.with_writer(file_appender).with_ansi(false).try_init();
            return;
        }
        eprintln!("LOG_DIR {dir} does not exist, logging to stdout");
    }

    let _ = subscriber.try_init();
}

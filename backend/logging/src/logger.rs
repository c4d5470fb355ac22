//! Structured Logger
//!
//! Wraps `tracing` with environment-based level control, a console layer on
//! stderr and optional daily-rotated NDJSON files. Stdout is never written
//! to: it carries the scan response.

use std::io::IsTerminal;
use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log file prefix inside the log directory (`freshscan.log.YYYY-MM-DD`).
pub const LOG_FILE_PREFIX: &str = "freshscan.log";

/// Initialize the global structured logger.
///
/// `RUST_LOG` overrides `level`. With `json_console` the console layer emits
/// one JSON object per line instead of human-readable text.
pub fn init_logger(level: &str, log_dir: Option<&Path>, json_console: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let console_json = json_console.then(|| {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let console_text = (!json_console).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(std::io::stderr().is_terminal())
    });

    let file_layer = log_dir.map(|dir| {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
        fmt::layer()
            .json()
            .with_writer(file_appender)
            .with_ansi(false)
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_json)
        .with(console_text)
        .with(file_layer)
        .try_init();
}

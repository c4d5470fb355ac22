//! Telemetry and structured logging components for freshscan.
//!
//! Handles log redaction, console and rolling-file output, and structured scan event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, ScanEvent};
pub use logger::{LOG_FILE_PREFIX, init_logger};
pub use redact::redact_sensitive_data;

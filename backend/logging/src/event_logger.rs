//! Scan Event Logger
//!
//! Structured per-scan events (collaborator failures, resolved dates, item
//! counts) written through `tracing` on the `scan_events` target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanEvent {
    /// A detector or OCR call failed and its result was replaced by an empty one.
    CollaboratorFailed {
        collaborator: String,
        stage: String,
        error_msg: String,
    },
    DateResolved {
        date: String,
        phase: String,
        grammar: String,
    },
    NoDateFound {
        text_chars: usize,
    },
    ItemsAssigned {
        labels: usize,
        items: usize,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub scan_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: ScanEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Logs a scan event, scrubbing free-form strings first.
    pub fn log_event(scan_id: &str, event: ScanEvent) {
        let entry = EventLogEntry {
            scan_id: scan_id.into(),
            timestamp: Utc::now(),
            event: redact_event(event),
        };

        match &entry.event {
            ScanEvent::CollaboratorFailed { .. } => {
                warn!(target: "scan_events", event = ?entry, "Scan event");
            }
            _ => info!(target: "scan_events", event = ?entry, "Scan event"),
        }
    }
}

fn redact_event(mut event: ScanEvent) -> ScanEvent {
    if let ScanEvent::CollaboratorFailed { error_msg, .. } = &mut event {
        *error_msg = redact_sensitive_data(error_msg);
    }
    event
}

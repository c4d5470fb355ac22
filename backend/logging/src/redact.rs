//! Log Redaction Layer
//!
//! Scrubs image payloads, API keys and access tokens from strings prior to
//! logging. Collaborator errors can echo request bodies back at us.

use regex::Regex;
use std::sync::LazyLock;

static DATA_URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"data:[a-z]+/[a-z0-9.+-]+;base64,[A-Za-z0-9+/=]+").unwrap());
static BASE64_BLOB_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z0-9+/]{120,}={0,2}").unwrap());
static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(sk-[a-zA-Z0-9_-]{32,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)|(key=[A-Za-z0-9_\-]{20,})").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let mut redacted = input.to_string();

    // Image payloads, inline or as data URLs
    redacted = DATA_URL_RE.replace_all(&redacted, "[REDACTED_IMAGE]").to_string();
    redacted = BASE64_BLOB_RE.replace_all(&redacted, "[REDACTED_IMAGE]").to_string();

    // API keys and bearer tokens
    redacted = API_KEY_RE.replace_all(&redacted, "[REDACTED_TOKEN]").to_string();

    redacted
}

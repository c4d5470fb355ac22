use std::fmt;

use bytes::Bytes;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ScanError;

/// Name of the only field a scan request must carry.
pub const IMAGE_FIELD: &str = "image_base64";

/// One output record: an object name and the date paired with it, if any.
///
/// Dates serialize as `YYYY-MM-DD`; a missing date serializes as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub name: String,
    pub expiration_date: Option<NaiveDate>,
}

impl ItemRecord {
    pub fn new(name: impl Into<String>, expiration_date: Option<NaiveDate>) -> Self {
        Self {
            name: name.into(),
            expiration_date,
        }
    }
}

impl fmt::Display for ItemRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expiration_date {
            Some(date) => write!(f, "{} (expires {})", self.name, date),
            None => write!(f, "{} (no date)", self.name),
        }
    }
}

/// Distinct detector labels, iterated in the order they were first reported.
///
/// Labels are case-preserved and compared exactly, so "Milk" and "milk" are
/// two labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LabelSet(Vec<String>);

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a label. Returns `false` if it was already present.
    pub fn insert(&mut self, label: impl Into<String>) -> bool {
        let label = label.into();
        if self.contains(&label) {
            return false;
        }
        self.0.push(label);
        true
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|l| l == label)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for LabelSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = LabelSet::new();
        for label in iter {
            set.insert(label);
        }
        set
    }
}

/// A decoded image, re-encoded as PNG for handing to collaborators.
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub png: Bytes,
    pub width: u32,
    pub height: u32,
    /// MIME type of the image as it was submitted.
    pub source_mime: &'static str,
}

/// Incoming scan request: `{"image_base64": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    pub image_base64: String,
}

impl ScanRequest {
    /// Parse a raw request payload, classifying each way it can be unusable.
    pub fn from_json(raw: &str) -> Result<Self, ScanError> {
        if raw.trim().is_empty() {
            return Err(ScanError::EmptyInput);
        }
        let value: Value = serde_json::from_str(raw).map_err(ScanError::InvalidJson)?;
        match value.get(IMAGE_FIELD) {
            None => Err(ScanError::MissingField(IMAGE_FIELD)),
            Some(Value::String(image_base64)) => Ok(Self {
                image_base64: image_base64.clone(),
            }),
            Some(other) => Err(ScanError::undecodable(format!(
                "expected a base64 string, got {}",
                json_kind(other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Successful scan response: `{"detected_items": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResponse {
    pub detected_items: Vec<ItemRecord>,
}

/// Failed scan response: `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&ScanError> for ErrorResponse {
    fn from(err: &ScanError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

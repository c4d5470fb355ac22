use thiserror::Error;

/// Top-level error type for a freshscan request.
///
/// Only input and setup problems live here. Collaborator failures during a
/// scan are absorbed by the pipeline, and date normalization failures never
/// leave the resolver.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("No input data received.")]
    EmptyInput,

    #[error("Invalid JSON input.")]
    InvalidJson(#[source] serde_json::Error),

    #[error("No '{0}' field in input.")]
    MissingField(&'static str),

    #[error("Failed to decode base64 image.")]
    UndecodableImage { reason: String },

    #[error("Failed to load {collaborator}: {message}")]
    CollaboratorUnavailable { collaborator: String, message: String },
}

impl ScanError {
    pub fn undecodable(reason: impl ToString) -> Self {
        Self::UndecodableImage {
            reason: reason.to_string(),
        }
    }

    /// Whether the request itself was at fault (as opposed to the service).
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput
                | Self::InvalidJson(_)
                | Self::MissingField(_)
                | Self::UndecodableImage { .. }
        )
    }

    /// Process exit code reported by the CLI for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::EmptyInput | Self::InvalidJson(_) | Self::MissingField(_) => 2,
            Self::UndecodableImage { .. } => 3,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_wire_format() {
        assert_eq!(ScanError::EmptyInput.to_string(), "No input data received.");
        assert_eq!(
            ScanError::MissingField("image_base64").to_string(),
            "No 'image_base64' field in input."
        );
        assert_eq!(
            ScanError::undecodable("bad padding").to_string(),
            "Failed to decode base64 image."
        );
    }

    #[test]
    fn input_errors_have_distinct_exit_codes() {
        assert_eq!(ScanError::EmptyInput.exit_code(), 2);
        assert_eq!(ScanError::undecodable("x").exit_code(), 3);
        let unavailable = ScanError::CollaboratorUnavailable {
            collaborator: "object detector".into(),
            message: "no key".into(),
        };
        assert_eq!(unavailable.exit_code(), 1);
        assert!(ScanError::MissingField("image_base64").is_input_error());
        assert!(!unavailable.is_input_error());
    }
}

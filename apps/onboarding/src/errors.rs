use thiserror::Error;

/// Fallback shown for failures that carry no usable message of their own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Workflow-level error type.
///
/// Policy: `Validation` and `Server` carry messages that are shown to the
/// candidate verbatim; everything else falls back to a generic message.
/// No variant is retried automatically.
#[derive(Debug, Error)]
pub enum OnboardingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server error (status {status}): {message}")]
    Server { status: u16, message: String },

    #[error("Unexpected response shape: {0}")]
    Decode(String),

    #[error("An upload is already in progress for '{0}'")]
    UploadInFlight(String),

    #[error("No candidate has been resolved for this session")]
    NotResolved,
}

impl OnboardingError {
    /// The message rendered to the candidate.
    ///
    /// Server-provided and validation messages pass through verbatim;
    /// transport and decode failures collapse to the generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            OnboardingError::Validation(msg) => msg.clone(),
            OnboardingError::NotFound(msg) => msg.clone(),
            OnboardingError::Server { message, .. } if !message.is_empty() => message.clone(),
            OnboardingError::UploadInFlight(key) => {
                format!("An upload is already in progress for '{key}'")
            }
            OnboardingError::NotResolved => {
                "Please confirm your identity before uploading documents".to_string()
            }
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    /// True for failures rejected client-side before any request was issued.
    pub fn is_validation(&self) -> bool {
        matches!(self, OnboardingError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_passes_through_verbatim() {
        let err = OnboardingError::Validation("File size must be less than 5MB".to_string());
        assert_eq!(err.user_message(), "File size must be less than 5MB");
    }

    #[test]
    fn test_server_message_passes_through_verbatim() {
        let err = OnboardingError::Server {
            status: 422,
            message: "A document of this type already exists".to_string(),
        };
        assert_eq!(err.user_message(), "A document of this type already exists");
    }

    #[test]
    fn test_empty_server_message_falls_back_to_generic() {
        let err = OnboardingError::Server {
            status: 500,
            message: String::new(),
        };
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_decode_falls_back_to_generic() {
        let err = OnboardingError::Decode("missing field `id`".to_string());
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
    }
}

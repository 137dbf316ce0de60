use thiserror::Error;

/// Maximum number of error body characters surfaced to the user.
pub const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Request failed ({status}): {}", message.as_deref().unwrap_or("no details"))]
    Http {
        status: u16,
        message: Option<String>,
    },
    #[error("Response error: {0}")]
    Parse(String),
    #[error("Request error: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Message provided by the server in a rejection body, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Http {
                message: Some(message),
                ..
            } => Some(message.as_str()),
            _ => None,
        }
    }

    /// True when the server answered with a non-success status, as opposed to
    /// transport or decoding failures.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Http { .. })
    }
}

/// Trims and truncates a server-provided message; blank messages become `None`.
#[must_use]
pub fn sanitize_message(message: &str) -> Option<String> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(MAX_ERROR_CHARS).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_only_for_http_errors() {
        let rejected = ApiError::Http {
            status: 400,
            message: Some("Email not found".to_string()),
        };
        assert_eq!(rejected.server_message(), Some("Email not found"));
        assert!(rejected.is_rejection());

        let bare = ApiError::Http {
            status: 500,
            message: None,
        };
        assert_eq!(bare.server_message(), None);
        assert!(bare.is_rejection());

        let timeout = ApiError::Timeout("Request timed out.".to_string());
        assert_eq!(timeout.server_message(), None);
        assert!(!timeout.is_rejection());
    }

    #[test]
    fn sanitize_message_trims_and_truncates() {
        assert_eq!(sanitize_message("   "), None);
        assert_eq!(
            sanitize_message("  Invalid OTP \n"),
            Some("Invalid OTP".to_string())
        );

        let long = "x".repeat(MAX_ERROR_CHARS + 50);
        let sanitized = sanitize_message(&long).unwrap_or_default();
        assert_eq!(sanitized.chars().count(), MAX_ERROR_CHARS);
    }

    #[test]
    fn display_includes_status() {
        let err = ApiError::Http {
            status: 429,
            message: None,
        };
        assert_eq!(err.to_string(), "Request failed (429): no details");
    }
}

//! Provider-side errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An error reported by (or about) a provider.
///
/// Mid-stream errors arrive two ways: a [`crate::Fragment::Error`] carries a
/// `ProviderError` the provider itself reported and is recoverable (the
/// stream keeps going until its finish fragment); an `Err` item on the
/// fragment stream is a hard transport failure and ends the call.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderError {
    /// The provider API returned an error response.
    #[error("provider API error (status {status_code}): {message}")]
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Error message from the API.
        message: String,
        /// Provider error code, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        error_code: Option<String>,
        /// Whether retrying could help.
        retryable: bool,
    },

    /// Connection-level failure.
    #[error("provider connection error: {message}")]
    Connection {
        /// What went wrong.
        message: String,
        /// Whether this was a timeout.
        is_timeout: bool,
    },

    /// The provider sent something the decoder could not understand.
    #[error("malformed provider response: {message}")]
    MalformedResponse {
        /// What could not be decoded.
        message: String,
    },

    /// Anything else.
    #[error("{message}")]
    Other {
        /// The error message.
        message: String,
    },
}

impl ProviderError {
    /// Create an API error.
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status_code,
            message: message.into(),
            error_code: None,
            retryable: status_code == 429 || status_code >= 500,
        }
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            is_timeout: false,
        }
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            is_timeout: true,
        }
    }

    /// Create a malformed-response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a generic error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Whether a retry could plausibly succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api { retryable, .. } => *retryable,
            Self::Connection { .. } => true,
            Self::MalformedResponse { .. } | Self::Other { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_retryable() {
        assert!(ProviderError::api(429, "rate limited").is_retryable());
        assert!(ProviderError::api(503, "overloaded").is_retryable());
        assert!(!ProviderError::api(400, "bad request").is_retryable());
    }

    #[test]
    fn test_display() {
        let err = ProviderError::api(500, "boom");
        assert_eq!(err.to_string(), "provider API error (status 500): boom");
    }

    #[test]
    fn test_serde_roundtrip() {
        let err = ProviderError::timeout("read timed out");
        let json = serde_json::to_string(&err).unwrap();
        let parsed: ProviderError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, parsed);
    }
}

//! The engine's error type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use objstream_core::InvalidArgumentError;
use objstream_output::NoObjectGeneratedError;
use objstream_provider::ProviderError;

/// Any failure surfaced by a streaming structured-output call.
///
/// Propagation policy: recoverable provider errors ride the full stream and
/// never reject terminal values by themselves; only a finalization failure
/// (`NoObjectGenerated`), a hard transport failure (`Provider`), or
/// cancellation rejects them.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamObjectError {
    /// Bad input to the engine.
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgumentError),

    /// The stream finished without a valid object.
    #[error(transparent)]
    NoObjectGenerated(#[from] NoObjectGeneratedError),

    /// A provider error.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The call was cancelled by the consumer or the abort signal.
    #[error("stream cancelled")]
    Cancelled,

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

impl StreamObjectError {
    /// Whether this is a cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The `NoObjectGenerated` payload, when that is what this is.
    #[must_use]
    pub fn as_no_object_generated(&self) -> Option<&NoObjectGeneratedError> {
        match self {
            Self::NoObjectGenerated(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transparent_display() {
        let err: StreamObjectError = ProviderError::api(500, "boom").into();
        assert_eq!(err.to_string(), "provider API error (status 500): boom");
    }

    #[test]
    fn test_no_object_accessor() {
        let err: StreamObjectError = NoObjectGeneratedError::new("nope").into();
        assert!(err.as_no_object_generated().is_some());
        assert!(!err.is_cancelled());
        assert!(StreamObjectError::Cancelled.is_cancelled());
    }
}

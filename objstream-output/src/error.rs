//! Output validation errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use objstream_core::Usage;

/// A parsed value did not satisfy the schema's validator.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("type validation failed: {message}")]
pub struct TypeValidationError {
    /// What the validator rejected.
    pub message: String,
    /// The offending value.
    pub value: Value,
}

impl TypeValidationError {
    /// Create a new validation error.
    pub fn new(message: impl Into<String>, value: Value) -> Self {
        Self {
            message: message.into(),
            value,
        }
    }
}

/// Why the final text produced no object.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoObjectCause {
    /// The final text was not valid JSON.
    #[error("JSON parse error: {0}")]
    JsonParse(String),
    /// The parsed value failed schema validation.
    #[error(transparent)]
    TypeValidation(TypeValidationError),
}

/// The stream finished without producing a value that satisfies the output
/// strategy.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("no object generated: {message}")]
pub struct NoObjectGeneratedError {
    /// Human-readable summary.
    pub message: String,
    /// The underlying failure, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<NoObjectCause>,
    /// The accumulated text that failed to finalize.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Usage at the time of failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl NoObjectGeneratedError {
    /// Create a new error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
            text: None,
            usage: None,
        }
    }

    /// Attach the underlying cause.
    #[must_use]
    pub fn with_cause(mut self, cause: NoObjectCause) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Attach the accumulated text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Attach token usage.
    #[must_use]
    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Whether the cause was a schema validation failure.
    #[must_use]
    pub fn is_type_validation(&self) -> bool {
        matches!(self.cause, Some(NoObjectCause::TypeValidation(_)))
    }
}

impl From<TypeValidationError> for NoObjectGeneratedError {
    fn from(err: TypeValidationError) -> Self {
        let message = err.message.clone();
        NoObjectGeneratedError::new(message).with_cause(NoObjectCause::TypeValidation(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builders() {
        let err = NoObjectGeneratedError::new("response did not match schema")
            .with_cause(NoObjectCause::TypeValidation(TypeValidationError::new(
                "missing field `content`",
                json!({"invalid": true}),
            )))
            .with_text("{\"invalid\": true}")
            .with_usage(Usage::new(3, 10));
        assert!(err.is_type_validation());
        assert_eq!(err.usage.unwrap().total_tokens, 13);
        assert!(err.to_string().contains("did not match schema"));
    }

    #[test]
    fn test_parse_cause_is_not_validation() {
        let err = NoObjectGeneratedError::new("empty response")
            .with_cause(NoObjectCause::JsonParse("EOF while parsing".into()));
        assert!(!err.is_type_validation());
    }

    #[test]
    fn test_from_type_validation() {
        let err: NoObjectGeneratedError =
            TypeValidationError::new("bad", json!(null)).into();
        assert!(err.is_type_validation());
    }
}

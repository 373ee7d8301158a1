//! Shared error vocabulary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An argument passed to the engine was missing, malformed, or describes an
/// unsupported combination (for example `no-schema` output with tool mode).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("invalid argument `{parameter}`: {message}")]
pub struct InvalidArgumentError {
    /// Name of the offending parameter.
    pub parameter: String,
    /// What was wrong with it.
    pub message: String,
}

impl InvalidArgumentError {
    /// Create a new invalid-argument error.
    pub fn new(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            message: message.into(),
        }
    }
}

//! The multiplexed full-stream event vocabulary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use objstream_core::{FinishReason, Usage};

use crate::error::StreamObjectError;

/// One event on the full stream.
///
/// Ordering contract: the text delta for a buffer prefix precedes the
/// object snapshot derived from it, and exactly one [`Finish`]
/// (ObjectStreamPart::Finish) closes the stream, after every other event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ObjectStreamPart {
    /// A piece of the decoded JSON text.
    TextDelta {
        /// The text increment.
        text_delta: String,
    },
    /// A new distinct partial snapshot.
    Object {
        /// The snapshot.
        object: Value,
    },
    /// A recoverable error.
    Error {
        /// The error.
        error: StreamObjectError,
    },
    /// Terminal event.
    Finish {
        /// Why generation stopped.
        finish_reason: FinishReason,
        /// Final token usage.
        usage: Usage,
        /// Provider metadata from the finish fragment.
        #[serde(skip_serializing_if = "Option::is_none")]
        provider_metadata: Option<Value>,
        /// Log probabilities, when requested.
        #[serde(skip_serializing_if = "Option::is_none")]
        logprobs: Option<Value>,
    },
}

impl ObjectStreamPart {
    /// Whether this is the terminal event.
    #[must_use]
    pub fn is_finish(&self) -> bool {
        matches!(self, Self::Finish { .. })
    }

    /// The text delta, when this is one.
    #[must_use]
    pub fn as_text_delta(&self) -> Option<&str> {
        match self {
            Self::TextDelta { text_delta } => Some(text_delta),
            _ => None,
        }
    }

    /// The snapshot, when this is an object event.
    #[must_use]
    pub fn as_object(&self) -> Option<&Value> {
        match self {
            Self::Object { object } => Some(object),
            _ => None,
        }
    }
}

//! The streamed fragment vocabulary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use objstream_core::{FinishReason, Usage};

use crate::error::ProviderError;

/// One event from the provider's streaming decoder.
///
/// Ordering invariant: at most one [`Fragment::Finish`], which is terminal.
/// [`Fragment::Error`] may appear any number of times; only `Finish` closes
/// the stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Fragment {
    /// A piece of plain text.
    TextDelta {
        /// The text increment.
        text_delta: String,
    },

    /// A piece of tool-call arguments.
    ToolCallDelta {
        /// Provider-assigned call id, if already known.
        #[serde(skip_serializing_if = "Option::is_none")]
        tool_call_id: Option<String>,
        /// Name of the tool being called.
        tool_name: String,
        /// The argument-text increment.
        args_text_delta: String,
    },

    /// A complete tool call (some providers echo one after the deltas).
    ToolCall {
        /// Provider-assigned call id.
        tool_call_id: String,
        /// Name of the tool.
        tool_name: String,
        /// The complete argument text.
        args: String,
    },

    /// Terminal fragment closing the stream.
    Finish {
        /// Why generation stopped.
        finish_reason: FinishReason,
        /// Token usage for the call.
        usage: Usage,
        /// Provider-specific metadata.
        #[serde(skip_serializing_if = "Option::is_none")]
        provider_metadata: Option<Value>,
        /// Log probabilities, when requested.
        #[serde(skip_serializing_if = "Option::is_none")]
        logprobs: Option<Value>,
    },

    /// A recoverable error reported by the provider mid-stream.
    Error {
        /// The reported error.
        error: ProviderError,
    },
}

impl Fragment {
    /// Create a text delta.
    #[must_use]
    pub fn text_delta(text: impl Into<String>) -> Self {
        Self::TextDelta {
            text_delta: text.into(),
        }
    }

    /// Create a tool-call argument delta.
    #[must_use]
    pub fn tool_call_delta(tool_name: impl Into<String>, args: impl Into<String>) -> Self {
        Self::ToolCallDelta {
            tool_call_id: None,
            tool_name: tool_name.into(),
            args_text_delta: args.into(),
        }
    }

    /// Create a finish fragment.
    #[must_use]
    pub fn finish(finish_reason: FinishReason, usage: Usage) -> Self {
        Self::Finish {
            finish_reason,
            usage,
            provider_metadata: None,
            logprobs: None,
        }
    }

    /// Attach provider metadata to a finish fragment; no-op for other kinds.
    #[must_use]
    pub fn with_provider_metadata(mut self, metadata: Value) -> Self {
        if let Self::Finish {
            provider_metadata, ..
        } = &mut self
        {
            *provider_metadata = Some(metadata);
        }
        self
    }

    /// Create an error fragment.
    #[must_use]
    pub fn error(error: ProviderError) -> Self {
        Self::Error { error }
    }

    /// Whether this is the terminal fragment.
    #[must_use]
    pub fn is_finish(&self) -> bool {
        matches!(self, Self::Finish { .. })
    }
}

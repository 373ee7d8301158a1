//! Token usage accounting and finish reasons.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Token usage for a single call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt.
    pub prompt_tokens: u64,
    /// Tokens in the completion.
    pub completion_tokens: u64,
    /// Prompt plus completion tokens.
    pub total_tokens: u64,
}

impl Usage {
    /// Create a usage record; the total is derived.
    #[must_use]
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }

    /// Sum two usage records.
    #[must_use]
    pub fn add(&self, other: &Usage) -> Usage {
        Usage::new(
            self.prompt_tokens + other.prompt_tokens,
            self.completion_tokens + other.completion_tokens,
        )
    }
}

/// Why the provider stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinishReason {
    /// Natural stop or stop sequence.
    Stop,
    /// Token limit reached.
    Length,
    /// Content filter intervened.
    ContentFilter,
    /// Generation ended on tool calls.
    ToolCalls,
    /// Provider-side error ended the stream.
    Error,
    /// Any other provider-specific reason.
    Other,
    /// The provider did not report a reason.
    Unknown,
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stop => write!(f, "stop"),
            Self::Length => write!(f, "length"),
            Self::ContentFilter => write!(f, "content-filter"),
            Self::ToolCalls => write!(f, "tool-calls"),
            Self::Error => write!(f, "error"),
            Self::Other => write!(f, "other"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

//! Options for a provider call.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use objstream_core::{CallSettings, InputFormat, Message};

/// The tool definition sent to the provider in tool mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Tool kind; always `"function"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// JSON Schema for the tool arguments.
    pub parameters: Value,
}

impl ToolSpec {
    /// Create a function tool spec.
    #[must_use]
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self {
            kind: "function".to_string(),
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// The provider-facing decoding discipline for one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CallMode {
    /// The provider should emit JSON text as text deltas.
    ObjectJson {
        /// Schema name, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        /// Schema description, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        /// The JSON Schema, omitted for free-form output.
        #[serde(skip_serializing_if = "Option::is_none")]
        schema: Option<Value>,
    },
    /// The provider should emit the JSON as arguments of one tool call.
    ObjectTool {
        /// The tool the provider must call.
        tool: ToolSpec,
    },
}

/// Everything a provider needs for one streaming call.
#[derive(Debug, Clone)]
pub struct CallOptions {
    /// Decoding discipline.
    pub mode: CallMode,
    /// How the caller phrased the prompt.
    pub input_format: InputFormat,
    /// The normalized message list.
    pub messages: Vec<Message>,
    /// Sampling settings and headers.
    pub settings: CallSettings,
    /// Cancellation signal, honored by the provider's transport.
    pub abort: Option<CancellationToken>,
    /// Opaque metadata forwarded to the provider.
    pub provider_metadata: Option<Value>,
}

impl CallOptions {
    /// Create options with the given mode and messages.
    #[must_use]
    pub fn new(mode: CallMode, input_format: InputFormat, messages: Vec<Message>) -> Self {
        Self {
            mode,
            input_format,
            messages,
            settings: CallSettings::default(),
            abort: None,
            provider_metadata: None,
        }
    }

    /// Set the call settings.
    #[must_use]
    pub fn with_settings(mut self, settings: CallSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the cancellation token.
    #[must_use]
    pub fn with_abort(mut self, token: CancellationToken) -> Self {
        self.abort = Some(token);
        self
    }

    /// Set provider metadata.
    #[must_use]
    pub fn with_provider_metadata(mut self, metadata: Value) -> Self {
        self.provider_metadata = Some(metadata);
        self
    }
}

//! The provider's response envelope.

use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::pin::Pin;

use crate::error::ProviderError;
use crate::fragment::Fragment;

/// The upstream fragment stream.
///
/// `Ok` items are fragments; an `Err` item is a hard transport failure that
/// ends the call (unlike a [`Fragment::Error`], which is recoverable).
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<Fragment, ProviderError>> + Send>>;

/// What the provider actually sent over the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCall {
    /// The rendered prompt payload.
    pub raw_prompt: Value,
    /// The rendered settings payload.
    pub raw_settings: Value,
}

/// Transport-level response metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawResponse {
    /// Response headers, if the transport exposes them.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub headers: Vec<(String, String)>,
}

/// A non-fatal notice about how the call was made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CallWarning {
    /// A requested setting is not supported by this provider.
    UnsupportedSetting {
        /// The setting name.
        setting: String,
        /// Extra detail.
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
    /// Anything else worth telling the caller.
    Other {
        /// The warning message.
        message: String,
    },
}

/// Result of [`crate::LanguageModel::do_stream`].
pub struct StreamResponse {
    /// The ordered fragment stream. The engine is its only reader.
    pub stream: FragmentStream,
    /// What was sent.
    pub raw_call: RawCall,
    /// Transport metadata, when available.
    pub raw_response: Option<RawResponse>,
    /// Non-fatal notices.
    pub warnings: Vec<CallWarning>,
}

impl StreamResponse {
    /// Wrap a fragment stream with empty metadata.
    pub fn new(stream: FragmentStream) -> Self {
        Self {
            stream,
            raw_call: RawCall::default(),
            raw_response: None,
            warnings: Vec::new(),
        }
    }
}

impl std::fmt::Debug for StreamResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamResponse")
            .field("raw_call", &self.raw_call)
            .field("raw_response", &self.raw_response)
            .field("warnings", &self.warnings)
            .field("stream", &"<stream>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    #[test]
    fn test_stream_response_debug() {
        let response = StreamResponse::new(Box::pin(stream::iter(Vec::new())));
        let debug = format!("{:?}", response);
        assert!(debug.contains("<stream>"));
    }

    #[test]
    fn test_warning_serde() {
        let warning = CallWarning::UnsupportedSetting {
            setting: "top_k".into(),
            details: None,
        };
        let json = serde_json::to_string(&warning).unwrap();
        assert!(json.contains("\"type\":\"unsupported-setting\""));
    }
}

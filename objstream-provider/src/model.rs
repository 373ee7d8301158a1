//! The language-model trait.

use async_trait::async_trait;
use std::sync::Arc;

use objstream_core::ObjectGenerationMode;

use crate::error::ProviderError;
use crate::options::CallOptions;
use crate::response::StreamResponse;

/// A streaming language model.
///
/// Implementations own all transport concerns: HTTP, retries, timeouts,
/// connection pooling. The engine only calls [`do_stream`](Self::do_stream)
/// and consumes the returned fragment stream.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Provider name, e.g. `"openai"`.
    fn provider(&self) -> &str;

    /// Model id, e.g. `"gpt-4o-mini"`.
    fn model_id(&self) -> &str;

    /// The object-generation mode to use when the caller asks for `auto`.
    fn default_object_generation_mode(&self) -> Option<ObjectGenerationMode> {
        None
    }

    /// Whether the provider enforces JSON schemas natively. When `true` the
    /// engine does not augment the prompt with the schema in json mode.
    fn supports_structured_outputs(&self) -> bool {
        false
    }

    /// Whether image parts may reference URLs directly.
    fn supports_image_urls(&self) -> bool {
        true
    }

    /// Start a streaming call.
    async fn do_stream(&self, options: CallOptions) -> Result<StreamResponse, ProviderError>;
}

/// A shared language model for dynamic dispatch.
pub type BoxedLanguageModel = Arc<dyn LanguageModel>;

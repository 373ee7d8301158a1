//! A scripted language model for tests.

use async_trait::async_trait;
use futures::stream;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use objstream_core::ObjectGenerationMode;

use crate::error::ProviderError;
use crate::fragment::Fragment;
use crate::model::LanguageModel;
use crate::options::CallOptions;
use crate::response::{RawCall, StreamResponse};

/// A language model that replays scripted fragment transcripts.
///
/// Each call to [`do_stream`](LanguageModel::do_stream) pops the next queued
/// transcript and records the [`CallOptions`] it received, so tests can
/// assert both what the engine sent and what it did with the reply.
///
/// # Example
///
/// ```rust
/// use objstream_provider::{Fragment, MockLanguageModel};
/// use objstream_core::{FinishReason, Usage};
///
/// let model = MockLanguageModel::new("mock-model").with_fragments(vec![
///     Fragment::text_delta("{\"a\":"),
///     Fragment::text_delta("1}"),
///     Fragment::finish(FinishReason::Stop, Usage::new(3, 10)),
/// ]);
/// ```
#[derive(Clone)]
pub struct MockLanguageModel {
    model_id: String,
    default_mode: Option<ObjectGenerationMode>,
    supports_structured_outputs: bool,
    transcripts: Arc<Mutex<VecDeque<Vec<Result<Fragment, ProviderError>>>>>,
    stream_error: Arc<Mutex<Option<ProviderError>>>,
    calls: Arc<Mutex<Vec<CallOptions>>>,
}

impl MockLanguageModel {
    /// Create a mock model with no scripted responses.
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            default_mode: None,
            supports_structured_outputs: false,
            transcripts: Arc::new(Mutex::new(VecDeque::new())),
            stream_error: Arc::new(Mutex::new(None)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a transcript of plain fragments.
    #[must_use]
    pub fn with_fragments(self, fragments: Vec<Fragment>) -> Self {
        self.transcripts
            .lock()
            .push_back(fragments.into_iter().map(Ok).collect());
        self
    }

    /// Queue a transcript that may contain hard transport failures.
    #[must_use]
    pub fn with_transcript(self, items: Vec<Result<Fragment, ProviderError>>) -> Self {
        self.transcripts.lock().push_back(items);
        self
    }

    /// Make the next `do_stream` call itself fail.
    #[must_use]
    pub fn with_stream_error(self, error: ProviderError) -> Self {
        *self.stream_error.lock() = Some(error);
        self
    }

    /// Set the advertised default object-generation mode.
    #[must_use]
    pub fn with_default_mode(mut self, mode: ObjectGenerationMode) -> Self {
        self.default_mode = Some(mode);
        self
    }

    /// Set whether the model advertises native structured-output support.
    #[must_use]
    pub fn with_structured_outputs(mut self, supported: bool) -> Self {
        self.supports_structured_outputs = supported;
        self
    }

    /// All call options received so far.
    pub fn recorded_calls(&self) -> Vec<CallOptions> {
        self.calls.lock().clone()
    }

    /// The most recent call options, if any call happened.
    pub fn last_call(&self) -> Option<CallOptions> {
        self.calls.lock().last().cloned()
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn default_object_generation_mode(&self) -> Option<ObjectGenerationMode> {
        self.default_mode
    }

    fn supports_structured_outputs(&self) -> bool {
        self.supports_structured_outputs
    }

    async fn do_stream(&self, options: CallOptions) -> Result<StreamResponse, ProviderError> {
        self.calls.lock().push(options.clone());

        if let Some(error) = self.stream_error.lock().take() {
            return Err(error);
        }

        let items = self.transcripts.lock().pop_front().unwrap_or_default();
        let mut response = StreamResponse::new(Box::pin(stream::iter(items)));
        response.raw_call = RawCall {
            raw_prompt: serde_json::to_value(&options.messages)
                .unwrap_or(serde_json::Value::Null),
            raw_settings: serde_json::to_value(&options.settings)
                .unwrap_or(serde_json::Value::Null),
        };
        Ok(response)
    }
}

//! Options for [`stream_object`](crate::stream_object).

use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use objstream_core::{
    generate_stream_id, now_millis, CallSettings, FinishReason, Message, Mode, OutputShape, Usage,
};
use objstream_output::Schema;
use objstream_provider::{BoxedLanguageModel, CallWarning, LanguageModel};
use objstream_streaming::{StreamObjectError, DEFAULT_BUFFER_CAPACITY};
use objstream_telemetry::TelemetrySettings;

/// Engine clock hook, milliseconds.
pub type NowFn = Arc<dyn Fn() -> u64 + Send + Sync>;

/// Engine id-generation hook.
pub type IdFn = Arc<dyn Fn() -> String + Send + Sync>;

/// Internal hooks, overridable for deterministic tests.
#[derive(Clone)]
pub struct EngineInternals {
    /// Sole time source for latency metrics.
    pub now: NowFn,
    /// Generates the response id.
    pub generate_id: IdFn,
}

impl Default for EngineInternals {
    fn default() -> Self {
        Self {
            now: Arc::new(now_millis),
            generate_id: Arc::new(generate_stream_id),
        }
    }
}

impl std::fmt::Debug for EngineInternals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineInternals").finish_non_exhaustive()
    }
}

/// What [`on_finish`](StreamObjectOptions::on_finish) receives.
///
/// Exactly one of `object` / `error` is present, matching the validation
/// outcome.
#[derive(Debug, Clone)]
pub struct FinishEvent {
    /// The validated object, when finalization succeeded.
    pub object: Option<Value>,
    /// The failure, when it did not.
    pub error: Option<StreamObjectError>,
    /// Final token usage.
    pub usage: Usage,
    /// Why generation stopped.
    pub finish_reason: FinishReason,
    /// Provider metadata from the finish fragment.
    pub provider_metadata: Option<Value>,
    /// Provider and engine warnings for this call.
    pub warnings: Vec<CallWarning>,
}

/// Callback invoked once after terminal resolution. Not invoked on
/// cancellation or hard transport failure.
pub type FinishCallback = Box<dyn FnOnce(FinishEvent) + Send>;

/// Options for a streaming structured-output call.
pub struct StreamObjectOptions {
    /// The provider.
    pub model: BoxedLanguageModel,
    /// Schema descriptor; element schema for the array shape. Required for
    /// `object` and `array`, forbidden for `no-schema`.
    pub schema: Option<Schema>,
    /// Schema name forwarded to the provider (tool name in tool mode).
    pub schema_name: Option<String>,
    /// Schema description forwarded to the provider.
    pub schema_description: Option<String>,
    /// Requested generation mode.
    pub mode: Mode,
    /// Output shape.
    pub output: OutputShape,
    /// System instructions.
    pub system: Option<String>,
    /// Free-form prompt; exclusive with `messages`.
    pub prompt: Option<String>,
    /// Message list; exclusive with `prompt`.
    pub messages: Option<Vec<Message>>,
    /// Sampling settings and headers.
    pub settings: CallSettings,
    /// Opaque metadata forwarded to the provider.
    pub provider_metadata: Option<Value>,
    /// Abort signal; cancelling it rejects terminal values with
    /// `Cancelled`.
    pub abort: Option<CancellationToken>,
    /// Telemetry configuration.
    pub telemetry: TelemetrySettings,
    /// Per-consumer buffer depth for the derived streams.
    pub buffer_capacity: usize,
    /// Callback invoked after terminal resolution.
    pub on_finish: Option<FinishCallback>,
    /// Clock and id hooks.
    pub internal: EngineInternals,
}

impl StreamObjectOptions {
    /// Create options for a model.
    #[must_use]
    pub fn new(model: impl LanguageModel + 'static) -> Self {
        Self::from_shared(Arc::new(model))
    }

    /// Create options for an already-shared model.
    #[must_use]
    pub fn from_shared(model: BoxedLanguageModel) -> Self {
        Self {
            model,
            schema: None,
            schema_name: None,
            schema_description: None,
            mode: Mode::default(),
            output: OutputShape::default(),
            system: None,
            prompt: None,
            messages: None,
            settings: CallSettings::default(),
            provider_metadata: None,
            abort: None,
            telemetry: TelemetrySettings::default(),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            on_finish: None,
            internal: EngineInternals::default(),
        }
    }

    /// Set the schema.
    #[must_use]
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Set the schema name.
    #[must_use]
    pub fn with_schema_name(mut self, name: impl Into<String>) -> Self {
        self.schema_name = Some(name.into());
        self
    }

    /// Set the schema description.
    #[must_use]
    pub fn with_schema_description(mut self, description: impl Into<String>) -> Self {
        self.schema_description = Some(description.into());
        self
    }

    /// Set the generation mode.
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the output shape.
    #[must_use]
    pub fn with_output(mut self, output: OutputShape) -> Self {
        self.output = output;
        self
    }

    /// Set the system instructions.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the free-form prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Set the message list.
    #[must_use]
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = Some(messages);
        self
    }

    /// Set the call settings.
    #[must_use]
    pub fn with_settings(mut self, settings: CallSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set provider metadata.
    #[must_use]
    pub fn with_provider_metadata(mut self, metadata: Value) -> Self {
        self.provider_metadata = Some(metadata);
        self
    }

    /// Set the abort token.
    #[must_use]
    pub fn with_abort(mut self, token: CancellationToken) -> Self {
        self.abort = Some(token);
        self
    }

    /// Set the telemetry configuration.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: TelemetrySettings) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Set the per-consumer buffer depth.
    #[must_use]
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Set the finish callback.
    #[must_use]
    pub fn on_finish(mut self, callback: impl FnOnce(FinishEvent) + Send + 'static) -> Self {
        self.on_finish = Some(Box::new(callback));
        self
    }

    /// Override the clock and id hooks.
    #[must_use]
    pub fn with_internal(mut self, internal: EngineInternals) -> Self {
        self.internal = internal;
        self
    }
}

impl std::fmt::Debug for StreamObjectOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamObjectOptions")
            .field("model", &self.model.model_id())
            .field("mode", &self.mode)
            .field("output", &self.output)
            .field("schema", &self.schema)
            .field("buffer_capacity", &self.buffer_capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objstream_provider::MockLanguageModel;

    #[test]
    fn test_defaults() {
        let options = StreamObjectOptions::new(MockLanguageModel::new("m"));
        assert_eq!(options.mode, Mode::Auto);
        assert_eq!(options.output, OutputShape::Object);
        assert_eq!(options.buffer_capacity, DEFAULT_BUFFER_CAPACITY);
        assert!(options.on_finish.is_none());
        assert!(!options.telemetry.is_enabled);
    }

    #[test]
    fn test_builder_chain() {
        let options = StreamObjectOptions::new(MockLanguageModel::new("m"))
            .with_prompt("extract")
            .with_mode(Mode::Tool)
            .with_output(OutputShape::Array)
            .with_buffer_capacity(8)
            .on_finish(|_| {});
        assert_eq!(options.prompt.as_deref(), Some("extract"));
        assert_eq!(options.mode, Mode::Tool);
        assert_eq!(options.output, OutputShape::Array);
        assert_eq!(options.buffer_capacity, 8);
        assert!(options.on_finish.is_some());
    }
}

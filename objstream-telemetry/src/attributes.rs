//! Attribute assembly.
//!
//! Span attributes merge three vocabularies: engine-specific `ai.*` keys,
//! OpenTelemetry GenAI semantic-convention `gen_ai.*` keys, and the general
//! `operation.name` / `resource.name` pair. The helpers here build each
//! group in a fixed order.

use objstream_core::{CallSettings, FinishReason, Usage};

use crate::settings::TelemetrySettings;
use crate::span::Attributes;

/// Attribute and event name constants.
pub mod keys {
    /// General operation name.
    pub const OPERATION_NAME: &str = "operation.name";
    /// General resource name.
    pub const RESOURCE_NAME: &str = "resource.name";

    /// Provider name.
    pub const AI_MODEL_PROVIDER: &str = "ai.model.provider";
    /// Model id.
    pub const AI_MODEL_ID: &str = "ai.model.id";
    /// The rendered prompt.
    pub const AI_PROMPT: &str = "ai.prompt";
    /// Prompt input format.
    pub const AI_PROMPT_FORMAT: &str = "ai.prompt.format";
    /// Prompt messages as JSON.
    pub const AI_PROMPT_MESSAGES: &str = "ai.prompt.messages";
    /// The JSON schema sent to the model.
    pub const AI_SCHEMA: &str = "ai.schema";
    /// Schema name.
    pub const AI_SCHEMA_NAME: &str = "ai.schema.name";
    /// Schema description.
    pub const AI_SCHEMA_DESCRIPTION: &str = "ai.schema.description";
    /// Resolved generation mode.
    pub const AI_SETTINGS_MODE: &str = "ai.settings.mode";
    /// Output shape.
    pub const AI_SETTINGS_OUTPUT: &str = "ai.settings.output";
    /// Retry budget.
    pub const AI_SETTINGS_MAX_RETRIES: &str = "ai.settings.maxRetries";
    /// Function id.
    pub const AI_TELEMETRY_FUNCTION_ID: &str = "ai.telemetry.functionId";
    /// Prefix for caller metadata.
    pub const AI_TELEMETRY_METADATA_PREFIX: &str = "ai.telemetry.metadata.";
    /// Prompt tokens.
    pub const AI_USAGE_PROMPT_TOKENS: &str = "ai.usage.promptTokens";
    /// Completion tokens.
    pub const AI_USAGE_COMPLETION_TOKENS: &str = "ai.usage.completionTokens";
    /// Finish reason.
    pub const AI_FINISH_REASON: &str = "ai.finishReason";
    /// Final object.
    pub const AI_RESPONSE_OBJECT: &str = "ai.response.object";
    /// Deprecated alias of [`AI_RESPONSE_OBJECT`].
    pub const AI_RESULT_OBJECT: &str = "ai.result.object";
    /// Milliseconds to first chunk.
    pub const AI_RESPONSE_MS_TO_FIRST_CHUNK: &str = "ai.response.msToFirstChunk";
    /// Milliseconds to finish.
    pub const AI_RESPONSE_MS_TO_FINISH: &str = "ai.response.msToFinish";
    /// Average completion tokens per second.
    pub const AI_RESPONSE_AVG_COMPLETION_TOKENS_PER_SECOND: &str =
        "ai.response.avgCompletionTokensPerSecond";

    /// GenAI provider system.
    pub const GEN_AI_SYSTEM: &str = "gen_ai.system";
    /// GenAI requested model.
    pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";
    /// GenAI temperature.
    pub const GEN_AI_REQUEST_TEMPERATURE: &str = "gen_ai.request.temperature";
    /// GenAI top-p.
    pub const GEN_AI_REQUEST_TOP_P: &str = "gen_ai.request.top_p";
    /// GenAI top-k.
    pub const GEN_AI_REQUEST_TOP_K: &str = "gen_ai.request.top_k";
    /// GenAI frequency penalty.
    pub const GEN_AI_REQUEST_FREQUENCY_PENALTY: &str = "gen_ai.request.frequency_penalty";
    /// GenAI presence penalty.
    pub const GEN_AI_REQUEST_PRESENCE_PENALTY: &str = "gen_ai.request.presence_penalty";
    /// GenAI stop sequences.
    pub const GEN_AI_REQUEST_STOP_SEQUENCES: &str = "gen_ai.request.stop_sequences";
    /// GenAI max tokens.
    pub const GEN_AI_REQUEST_MAX_TOKENS: &str = "gen_ai.request.max_tokens";
    /// GenAI finish reasons.
    pub const GEN_AI_RESPONSE_FINISH_REASONS: &str = "gen_ai.response.finish_reasons";
    /// GenAI input tokens.
    pub const GEN_AI_USAGE_INPUT_TOKENS: &str = "gen_ai.usage.input_tokens";
    /// GenAI output tokens.
    pub const GEN_AI_USAGE_OUTPUT_TOKENS: &str = "gen_ai.usage.output_tokens";

    /// Response id.
    pub const AI_RESPONSE_ID: &str = "ai.response.id";

    /// First-chunk stream event.
    pub const EVENT_STREAM_FIRST_CHUNK: &str = "ai.stream.firstChunk";
    /// Finish stream event.
    pub const EVENT_STREAM_FINISH: &str = "ai.stream.finish";
    /// Exception event.
    pub const EVENT_EXCEPTION: &str = "exception";
    /// Exception message attribute.
    pub const EXCEPTION_MESSAGE: &str = "exception.message";
}

/// `operation.name`, `resource.name`, and caller telemetry metadata.
#[must_use]
pub fn operation_attributes(operation: &str, settings: &TelemetrySettings) -> Attributes {
    let mut attrs = Attributes::new();
    let operation_name = match &settings.function_id {
        Some(function_id) => format!("{operation} {function_id}"),
        None => operation.to_string(),
    };
    attrs.insert(keys::OPERATION_NAME.into(), operation_name.into());
    if let Some(function_id) = &settings.function_id {
        attrs.insert(keys::RESOURCE_NAME.into(), function_id.clone().into());
        attrs.insert(
            keys::AI_TELEMETRY_FUNCTION_ID.into(),
            function_id.clone().into(),
        );
    }
    for (key, value) in &settings.metadata {
        attrs.insert(
            format!("{}{}", keys::AI_TELEMETRY_METADATA_PREFIX, key),
            value.clone(),
        );
    }
    attrs
}

/// Provider identity in both vocabularies.
#[must_use]
pub fn model_attributes(provider: &str, model_id: &str) -> Attributes {
    let mut attrs = Attributes::new();
    attrs.insert(keys::AI_MODEL_PROVIDER.into(), provider.into());
    attrs.insert(keys::AI_MODEL_ID.into(), model_id.into());
    attrs.insert(keys::GEN_AI_SYSTEM.into(), provider.into());
    attrs.insert(keys::GEN_AI_REQUEST_MODEL.into(), model_id.into());
    attrs
}

/// GenAI request attributes for the call settings that are set.
#[must_use]
pub fn request_attributes(settings: &CallSettings) -> Attributes {
    let mut attrs = Attributes::new();
    if let Some(temperature) = settings.temperature {
        attrs.insert(
            keys::GEN_AI_REQUEST_TEMPERATURE.into(),
            f64::from(temperature).into(),
        );
    }
    if let Some(top_p) = settings.top_p {
        attrs.insert(keys::GEN_AI_REQUEST_TOP_P.into(), f64::from(top_p).into());
    }
    if let Some(top_k) = settings.top_k {
        attrs.insert(keys::GEN_AI_REQUEST_TOP_K.into(), u64::from(top_k).into());
    }
    if let Some(frequency_penalty) = settings.frequency_penalty {
        attrs.insert(
            keys::GEN_AI_REQUEST_FREQUENCY_PENALTY.into(),
            f64::from(frequency_penalty).into(),
        );
    }
    if let Some(presence_penalty) = settings.presence_penalty {
        attrs.insert(
            keys::GEN_AI_REQUEST_PRESENCE_PENALTY.into(),
            f64::from(presence_penalty).into(),
        );
    }
    if let Some(stop_sequences) = &settings.stop_sequences {
        attrs.insert(
            keys::GEN_AI_REQUEST_STOP_SEQUENCES.into(),
            stop_sequences.clone().into(),
        );
    }
    if let Some(max_tokens) = settings.max_tokens {
        attrs.insert(
            keys::GEN_AI_REQUEST_MAX_TOKENS.into(),
            u64::from(max_tokens).into(),
        );
    }
    if let Some(max_retries) = settings.max_retries {
        attrs.insert(
            keys::AI_SETTINGS_MAX_RETRIES.into(),
            u64::from(max_retries).into(),
        );
    }
    attrs
}

/// Usage attributes in both vocabularies.
#[must_use]
pub fn usage_attributes(usage: &Usage) -> Attributes {
    let mut attrs = Attributes::new();
    attrs.insert(keys::AI_USAGE_PROMPT_TOKENS.into(), usage.prompt_tokens.into());
    attrs.insert(
        keys::AI_USAGE_COMPLETION_TOKENS.into(),
        usage.completion_tokens.into(),
    );
    attrs.insert(
        keys::GEN_AI_USAGE_INPUT_TOKENS.into(),
        usage.prompt_tokens.into(),
    );
    attrs.insert(
        keys::GEN_AI_USAGE_OUTPUT_TOKENS.into(),
        usage.completion_tokens.into(),
    );
    attrs
}

/// Finish-reason attributes in both vocabularies.
#[must_use]
pub fn finish_reason_attributes(reason: FinishReason) -> Attributes {
    let mut attrs = Attributes::new();
    attrs.insert(keys::AI_FINISH_REASON.into(), reason.to_string().into());
    attrs.insert(
        keys::GEN_AI_RESPONSE_FINISH_REASONS.into(),
        vec![reason.to_string()].into(),
    );
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::AttributeValue;
    use crate::tracer::InMemoryTracer;

    #[test]
    fn test_operation_attributes_with_function_id() {
        let settings = TelemetrySettings::enabled(InMemoryTracer::new())
            .with_function_id("extract")
            .with_metadata("tenant", "acme");
        let attrs = operation_attributes("ai.streamObject", &settings);
        assert_eq!(
            attrs.get(keys::OPERATION_NAME),
            Some(&AttributeValue::String("ai.streamObject extract".into()))
        );
        assert_eq!(
            attrs.get(keys::RESOURCE_NAME),
            Some(&AttributeValue::String("extract".into()))
        );
        assert_eq!(
            attrs.get("ai.telemetry.metadata.tenant"),
            Some(&AttributeValue::String("acme".into()))
        );
    }

    #[test]
    fn test_operation_attributes_bare() {
        let attrs = operation_attributes("ai.streamObject", &TelemetrySettings::default());
        assert_eq!(
            attrs.get(keys::OPERATION_NAME),
            Some(&AttributeValue::String("ai.streamObject".into()))
        );
        assert!(attrs.get(keys::RESOURCE_NAME).is_none());
    }

    #[test]
    fn test_request_attributes_skips_unset() {
        let attrs = request_attributes(&CallSettings::default());
        assert!(attrs.is_empty());

        let attrs = request_attributes(
            &CallSettings::new()
                .with_temperature(0.5)
                .with_max_tokens(100),
        );
        assert_eq!(attrs.len(), 2);
        assert_eq!(
            attrs.get(keys::GEN_AI_REQUEST_MAX_TOKENS),
            Some(&AttributeValue::Int(100))
        );
    }

    #[test]
    fn test_usage_attributes() {
        let attrs = usage_attributes(&Usage::new(3, 10));
        assert_eq!(
            attrs.get(keys::GEN_AI_USAGE_INPUT_TOKENS),
            Some(&AttributeValue::Int(3))
        );
        assert_eq!(
            attrs.get(keys::AI_USAGE_COMPLETION_TOKENS),
            Some(&AttributeValue::Int(10))
        );
    }

    #[test]
    fn test_finish_reason_attributes() {
        let attrs = finish_reason_attributes(FinishReason::Stop);
        assert_eq!(
            attrs.get(keys::GEN_AI_RESPONSE_FINISH_REASONS),
            Some(&AttributeValue::StringArray(vec!["stop".into()]))
        );
    }
}

//! Telemetry span assertions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::json;

use objstream::{
    stream_object, AttributeValue, CallSettings, EngineInternals, FinishReason, Fragment,
    InMemoryTracer, MockLanguageModel, Schema, SpanData, StreamObjectOptions, TelemetrySettings,
    Usage,
};

fn content_schema() -> Schema {
    Schema::permissive(json!({
        "type": "object",
        "properties": {"content": {"type": "string"}},
        "required": ["content"]
    }))
}

fn fragments() -> Vec<Fragment> {
    vec![
        Fragment::text_delta(r#"{"content": "#),
        Fragment::text_delta(r#""Hello, world!"}"#),
        Fragment::finish(FinishReason::Stop, Usage::new(3, 10)),
    ]
}

fn fixed_internals() -> EngineInternals {
    let tick = Arc::new(AtomicU64::new(0));
    EngineInternals {
        now: Arc::new(move || tick.fetch_add(10, Ordering::Relaxed)),
        generate_id: Arc::new(|| "strm_fixed".to_string()),
    }
}

fn s(value: &str) -> AttributeValue {
    AttributeValue::String(value.to_string())
}

fn i(value: i64) -> AttributeValue {
    AttributeValue::Int(value)
}

async fn run_with(telemetry: TelemetrySettings) -> Vec<SpanData> {
    let tracer = Arc::new(InMemoryTracer::new());
    let telemetry = TelemetrySettings {
        tracer: Some(tracer.clone()),
        ..telemetry
    };
    let model = MockLanguageModel::new("test-model").with_fragments(fragments());
    let (finish_tx, finish_rx) = tokio::sync::oneshot::channel::<()>();
    let result = stream_object(
        StreamObjectOptions::new(model)
            .with_schema(content_schema())
            .with_prompt("greet the world")
            .with_settings(CallSettings::new().with_temperature(0.0).with_max_tokens(64))
            .with_telemetry(telemetry)
            .with_internal(fixed_internals())
            .on_finish(move |_| {
                let _ = finish_tx.send(());
            }),
    )
    .await
    .unwrap();
    result.object().await.unwrap();
    // Spans end before on_finish fires, so this settles the recording race.
    finish_rx.await.unwrap();
    tracer.finished_spans()
}

#[tokio::test]
async fn test_disabled_records_no_spans() {
    let spans = run_with(TelemetrySettings {
        is_enabled: false,
        ..TelemetrySettings::default()
    })
    .await;
    assert!(spans.is_empty());
}

#[tokio::test]
async fn test_enabled_records_span_pair() {
    let spans = run_with(TelemetrySettings {
        is_enabled: true,
        ..TelemetrySettings::default()
    })
    .await;

    assert_eq!(spans.len(), 2);
    let inner = spans
        .iter()
        .find(|span| span.name == "ai.streamObject.doStream")
        .unwrap();
    let outer = spans
        .iter()
        .find(|span| span.name == "ai.streamObject")
        .unwrap();

    assert_eq!(inner.parent.as_deref(), Some("ai.streamObject"));
    assert!(outer.parent.is_none());

    // Operation / model vocabulary.
    assert_eq!(
        outer.attributes.get("operation.name"),
        Some(&s("ai.streamObject"))
    );
    assert_eq!(outer.attributes.get("gen_ai.system"), Some(&s("mock")));
    assert_eq!(
        outer.attributes.get("gen_ai.request.model"),
        Some(&s("test-model"))
    );
    assert_eq!(
        outer.attributes.get("gen_ai.request.max_tokens"),
        Some(&i(64))
    );
    assert_eq!(outer.attributes.get("ai.settings.mode"), Some(&s("json")));
    assert_eq!(
        outer.attributes.get("ai.settings.output"),
        Some(&s("object"))
    );

    // Usage and finish reason land on both spans.
    for span in [outer, inner] {
        assert_eq!(span.attributes.get("ai.usage.promptTokens"), Some(&i(3)));
        assert_eq!(
            span.attributes.get("gen_ai.usage.output_tokens"),
            Some(&i(10))
        );
        assert_eq!(span.attributes.get("ai.finishReason"), Some(&s("stop")));
        assert_eq!(
            span.attributes.get("gen_ai.response.finish_reasons"),
            Some(&AttributeValue::StringArray(vec!["stop".to_string()]))
        );
    }

    // Stream timing events live on the doStream span.
    let event_names: Vec<&str> = inner.events.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(event_names, vec!["ai.stream.firstChunk", "ai.stream.finish"]);
    assert!(inner.attributes.contains_key("ai.response.msToFirstChunk"));
    assert!(inner.attributes.contains_key("ai.response.msToFinish"));
    assert!(inner
        .attributes
        .contains_key("ai.response.avgCompletionTokensPerSecond"));
    assert_eq!(
        inner.attributes.get("ai.response.id"),
        Some(&s("strm_fixed"))
    );

    // Inputs and outputs are recorded by default.
    assert_eq!(
        outer.attributes.get("ai.prompt"),
        Some(&s("greet the world"))
    );
    assert!(outer.attributes.contains_key("ai.prompt.messages"));
    assert!(outer.attributes.contains_key("ai.schema"));
    assert!(outer.attributes.contains_key("ai.response.object"));
    assert!(outer.attributes.contains_key("ai.result.object"));
}

#[tokio::test]
async fn test_record_outputs_false_elides_response() {
    let spans = run_with(TelemetrySettings {
        is_enabled: true,
        record_outputs: false,
        ..TelemetrySettings::default()
    })
    .await;

    assert_eq!(spans.len(), 2);
    let outer = spans
        .iter()
        .find(|span| span.name == "ai.streamObject")
        .unwrap();
    assert!(!outer.attributes.contains_key("ai.response.object"));
    assert!(!outer.attributes.contains_key("ai.result.object"));
    // Inputs are still recorded.
    assert!(outer.attributes.contains_key("ai.prompt"));
}

#[tokio::test]
async fn test_record_inputs_false_elides_prompt_and_schema() {
    let spans = run_with(TelemetrySettings {
        is_enabled: true,
        record_inputs: false,
        ..TelemetrySettings::default()
    })
    .await;

    let outer = spans
        .iter()
        .find(|span| span.name == "ai.streamObject")
        .unwrap();
    assert!(!outer.attributes.contains_key("ai.prompt"));
    assert!(!outer.attributes.contains_key("ai.prompt.format"));
    assert!(!outer.attributes.contains_key("ai.prompt.messages"));
    assert!(!outer.attributes.contains_key("ai.schema"));
    // Outputs are still recorded.
    assert!(outer.attributes.contains_key("ai.response.object"));
}

#[tokio::test]
async fn test_function_id_and_metadata() {
    let spans = run_with(TelemetrySettings {
        is_enabled: true,
        function_id: Some("greet".to_string()),
        ..TelemetrySettings::default()
    })
    .await;

    let outer = spans
        .iter()
        .find(|span| span.name == "ai.streamObject")
        .unwrap();
    assert_eq!(
        outer.attributes.get("operation.name"),
        Some(&s("ai.streamObject greet"))
    );
    assert_eq!(outer.attributes.get("resource.name"), Some(&s("greet")));
    assert_eq!(
        outer.attributes.get("ai.telemetry.functionId"),
        Some(&s("greet"))
    );
}

// Two identical runs under a fixed clock and id generator produce
// identical span dumps.
#[tokio::test]
async fn test_idempotent_span_attributes() {
    let first = run_with(TelemetrySettings {
        is_enabled: true,
        ..TelemetrySettings::default()
    })
    .await;
    let second = run_with(TelemetrySettings {
        is_enabled: true,
        ..TelemetrySettings::default()
    })
    .await;

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

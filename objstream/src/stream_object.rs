//! The streaming structured-output engine.
//!
//! [`stream_object`] resolves the mode, builds the provider call, starts
//! the stream, and spawns a single pump task that owns the upstream
//! fragment stream and the rolling text buffer. The pump drives each text
//! delta through the partial-JSON parser and the output strategy, fans the
//! derived events out through bounded forks, and resolves the terminal
//! cells at finish.
//!
//! Lifecycle: `Init → Streaming → Finishing → Done`, with a `Failing` edge
//! taken on hard transport errors and a cancellation edge taken when the
//! abort token fires.

use futures::StreamExt;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use objstream_core::{FinishReason, InputFormat, Message, Prompt, Usage};
use objstream_output::{
    parse_partial_json, snapshot_changed, strategy_for, DeltaExtract, ModePlan, OutputStrategy,
};
use objstream_provider::{CallOptions, CallWarning, Fragment, FragmentStream, ProviderError};
use objstream_streaming::{ObjectStreamPart, StreamFork, StreamObjectError, TerminalCell};
use objstream_telemetry::{
    finish_reason_attributes, keys, model_attributes, operation_attributes, request_attributes,
    usage_attributes, Attributes, Span, TelemetryRecorder,
};

use crate::options::{FinishCallback, NowFn, StreamObjectOptions};
use crate::result::StreamObjectResult;

const OUTER_SPAN_NAME: &str = "ai.streamObject";
const INNER_SPAN_NAME: &str = "ai.streamObject.doStream";

/// Start a streaming structured-output call.
///
/// Returns once the provider call is established; everything after that is
/// surfaced through the result's streams and terminal accessors. Only
/// argument validation and provider-call setup can fail here.
pub async fn stream_object(
    mut options: StreamObjectOptions,
) -> Result<StreamObjectResult, StreamObjectError> {
    let now: NowFn = options.internal.now.clone();
    let response_id = (options.internal.generate_id)();

    let strategy = strategy_for(options.output, options.schema.clone())?;
    let json_schema = strategy.json_schema();

    let resolved_mode = options
        .mode
        .resolve(options.model.default_object_generation_mode());
    let plan = ModePlan::build(
        resolved_mode,
        options.output,
        json_schema.clone(),
        options.schema_name.clone(),
        options.schema_description.clone(),
        options.model.supports_structured_outputs(),
    )?;

    let prompt = Prompt {
        system: options.system.clone(),
        prompt: options.prompt.clone(),
        messages: options.messages.clone(),
    };
    let standardized = prompt.standardize()?;
    let mut messages = standardized.messages;
    if let Some(system) = &plan.inject_system {
        messages.insert(0, Message::system(system.clone()));
    }

    tracing::debug!(
        mode = %resolved_mode,
        output = %options.output,
        model = options.model.model_id(),
        "starting stream_object call"
    );

    let recorder = TelemetryRecorder::new(options.telemetry.clone());
    let start_ms = (now)();
    let outer_span = start_outer_span(
        &recorder,
        &options,
        &plan,
        json_schema.as_ref(),
        standardized.input_format,
        &messages,
        start_ms,
    );
    let inner_span = start_inner_span(&recorder, &options, &plan, start_ms);

    let token = options.abort.clone().unwrap_or_default();
    let mut call_options = CallOptions::new(
        plan.call_mode.clone(),
        standardized.input_format,
        messages,
    )
    .with_settings(options.settings.clone())
    .with_abort(token.clone());
    if let Some(metadata) = options.provider_metadata.clone() {
        call_options = call_options.with_provider_metadata(metadata);
    }

    let stream_start_ms = (now)();
    let response = match options.model.do_stream(call_options).await {
        Ok(response) => response,
        Err(error) => {
            end_spans_with_error(outer_span, inner_span, &error.to_string(), (now)());
            return Err(error.into());
        }
    };

    let capacity = options.buffer_capacity.max(1);
    let mut text_fork = StreamFork::new();
    let text_stream = text_fork.subscribe(capacity);
    let mut partial_fork = StreamFork::new();
    let partial_object_stream = partial_fork.subscribe(capacity);
    let mut full_fork = StreamFork::new();
    let full_stream = full_fork.subscribe(capacity);
    let (element_fork, element_stream) = if options.output == objstream_core::OutputShape::Array {
        let mut fork = StreamFork::new();
        let stream = fork.subscribe(capacity);
        (Some(fork), Some(stream))
    } else {
        (None, None)
    };

    let object_cell = TerminalCell::new();
    let usage_cell = TerminalCell::new();
    let finish_reason_cell = TerminalCell::new();
    let provider_metadata_cell = TerminalCell::new();

    let result = StreamObjectResult {
        partial_object_stream,
        text_stream,
        element_stream,
        full_stream,
        warnings: response.warnings.clone(),
        raw_response: response.raw_response.clone(),
        object: object_cell.clone(),
        usage: usage_cell.clone(),
        finish_reason: finish_reason_cell.clone(),
        provider_metadata: provider_metadata_cell.clone(),
        cancel: token.clone(),
    };

    let pump = Pump {
        upstream: response.stream,
        plan,
        strategy,
        text_fork,
        partial_fork,
        element_fork,
        full_fork,
        object_cell,
        usage_cell,
        finish_reason_cell,
        provider_metadata_cell,
        cancel: token,
        now,
        outer_span,
        inner_span,
        record_outputs: recorder.record_outputs(),
        on_finish: options.on_finish.take(),
        warnings: response.warnings,
        response_id,
        stream_start_ms,
        buffer: String::new(),
        last_snapshot: None,
        first_chunk_ms: None,
        ignored_text_warned: false,
    };
    tokio::spawn(pump.run());

    Ok(result)
}

fn start_outer_span(
    recorder: &TelemetryRecorder,
    options: &StreamObjectOptions,
    plan: &ModePlan,
    json_schema: Option<&Value>,
    input_format: InputFormat,
    messages: &[Message],
    start_ms: u64,
) -> Option<Span> {
    let mut span = recorder.start_span(OUTER_SPAN_NAME, None, start_ms)?;
    span.set_attributes(operation_attributes(OUTER_SPAN_NAME, recorder.settings()));
    span.set_attributes(model_attributes(
        options.model.provider(),
        options.model.model_id(),
    ));
    span.set_attributes(request_attributes(&options.settings));
    span.set_attribute(keys::AI_SETTINGS_MODE, plan.mode.to_string());
    span.set_attribute(keys::AI_SETTINGS_OUTPUT, options.output.to_string());
    if recorder.record_inputs() {
        span.set_attribute(
            keys::AI_PROMPT_FORMAT,
            match input_format {
                InputFormat::Prompt => "prompt",
                InputFormat::Messages => "messages",
            },
        );
        if let Some(prompt) = &options.prompt {
            span.set_attribute(keys::AI_PROMPT, prompt.clone());
        }
        span.set_attribute(
            keys::AI_PROMPT_MESSAGES,
            serde_json::to_string(messages).unwrap_or_default(),
        );
        if let Some(schema) = json_schema {
            span.set_attribute(keys::AI_SCHEMA, schema.to_string());
        }
        if let Some(name) = &options.schema_name {
            span.set_attribute(keys::AI_SCHEMA_NAME, name.clone());
        }
        if let Some(description) = &options.schema_description {
            span.set_attribute(keys::AI_SCHEMA_DESCRIPTION, description.clone());
        }
    }
    Some(span)
}

fn start_inner_span(
    recorder: &TelemetryRecorder,
    options: &StreamObjectOptions,
    plan: &ModePlan,
    start_ms: u64,
) -> Option<Span> {
    let mut span = recorder.start_span(
        INNER_SPAN_NAME,
        Some(OUTER_SPAN_NAME.to_string()),
        start_ms,
    )?;
    span.set_attributes(operation_attributes(INNER_SPAN_NAME, recorder.settings()));
    span.set_attributes(model_attributes(
        options.model.provider(),
        options.model.model_id(),
    ));
    span.set_attributes(request_attributes(&options.settings));
    span.set_attribute(keys::AI_SETTINGS_MODE, plan.mode.to_string());
    span.set_attribute(keys::AI_SETTINGS_OUTPUT, options.output.to_string());
    Some(span)
}

fn end_spans_with_error(
    outer: Option<Span>,
    inner: Option<Span>,
    message: &str,
    end_ms: u64,
) {
    for mut span in [inner, outer].into_iter().flatten() {
        span.record_error(message);
        span.end(end_ms);
    }
}

/// Everything carried by the terminal finish fragment.
struct FinishData {
    finish_reason: FinishReason,
    usage: Usage,
    provider_metadata: Option<Value>,
    logprobs: Option<Value>,
}

impl FinishData {
    /// Synthesized when the upstream ends without a finish fragment.
    fn missing() -> Self {
        Self {
            finish_reason: FinishReason::Unknown,
            usage: Usage::default(),
            provider_metadata: None,
            logprobs: None,
        }
    }
}

enum PumpTurn {
    Cancelled,
    Upstream(Option<Result<Fragment, ProviderError>>),
}

/// The single upstream reader. Owns the rolling buffer, the strategy
/// state, and all fan-out forks.
struct Pump {
    upstream: FragmentStream,
    plan: ModePlan,
    strategy: Box<dyn OutputStrategy>,
    text_fork: StreamFork<String>,
    partial_fork: StreamFork<Value>,
    element_fork: Option<StreamFork<Value>>,
    full_fork: StreamFork<ObjectStreamPart>,
    object_cell: TerminalCell<Value>,
    usage_cell: TerminalCell<Usage>,
    finish_reason_cell: TerminalCell<FinishReason>,
    provider_metadata_cell: TerminalCell<Option<Value>>,
    cancel: CancellationToken,
    now: NowFn,
    outer_span: Option<Span>,
    inner_span: Option<Span>,
    record_outputs: bool,
    on_finish: Option<FinishCallback>,
    warnings: Vec<CallWarning>,
    response_id: String,
    stream_start_ms: u64,
    buffer: String,
    last_snapshot: Option<Value>,
    first_chunk_ms: Option<u64>,
    ignored_text_warned: bool,
}

impl Pump {
    async fn run(mut self) {
        let cancel = self.cancel.clone();
        let finish = loop {
            let turn = tokio::select! {
                biased;
                _ = cancel.cancelled() => PumpTurn::Cancelled,
                next = self.upstream.next() => PumpTurn::Upstream(next),
            };
            match turn {
                PumpTurn::Cancelled => {
                    self.cancelled();
                    return;
                }
                PumpTurn::Upstream(Some(Ok(fragment))) => {
                    self.note_first_chunk(&fragment);
                    if let Some(finish) = self.handle_fragment(fragment).await {
                        break finish;
                    }
                }
                PumpTurn::Upstream(Some(Err(error))) => {
                    self.failed(error).await;
                    return;
                }
                PumpTurn::Upstream(None) => break FinishData::missing(),
            }
        };
        self.finishing(finish).await;
    }

    fn note_first_chunk(&mut self, fragment: &Fragment) {
        if self.first_chunk_ms.is_some() || matches!(fragment, Fragment::Error { .. }) {
            return;
        }
        let now_ms = (self.now)();
        self.first_chunk_ms = Some(now_ms);
        let ms_to_first_chunk = now_ms.saturating_sub(self.stream_start_ms);
        if let Some(span) = self.inner_span.as_mut() {
            let mut attrs = Attributes::new();
            attrs.insert(
                keys::AI_RESPONSE_MS_TO_FIRST_CHUNK.into(),
                ms_to_first_chunk.into(),
            );
            span.add_event(keys::EVENT_STREAM_FIRST_CHUNK, attrs);
            span.set_attribute(keys::AI_RESPONSE_MS_TO_FIRST_CHUNK, ms_to_first_chunk);
        }
    }

    async fn handle_fragment(&mut self, fragment: Fragment) -> Option<FinishData> {
        match fragment {
            Fragment::Finish {
                finish_reason,
                usage,
                provider_metadata,
                logprobs,
            } => {
                return Some(FinishData {
                    finish_reason,
                    usage,
                    provider_metadata,
                    logprobs,
                });
            }
            Fragment::Error { error } => {
                tracing::debug!(%error, "provider reported a recoverable error");
                let error = StreamObjectError::Provider(error);
                if let Some(span) = self.inner_span.as_mut() {
                    let mut attrs = Attributes::new();
                    attrs.insert(keys::EXCEPTION_MESSAGE.into(), error.to_string().into());
                    span.add_event(keys::EVENT_EXCEPTION, attrs);
                }
                self.full_fork
                    .publish(ObjectStreamPart::Error { error })
                    .await;
            }
            fragment => {
                let delta = match self.plan.extract_text_delta(&fragment) {
                    DeltaExtract::Delta(delta) => Some(delta.to_string()),
                    DeltaExtract::IgnoredText(_) => {
                        if !self.ignored_text_warned {
                            self.ignored_text_warned = true;
                            tracing::debug!("discarding bare text deltas in tool mode");
                            self.warnings.push(CallWarning::Other {
                                message: "text content in tool mode was ignored".to_string(),
                            });
                        }
                        None
                    }
                    DeltaExtract::Other => None,
                };
                if let Some(delta) = delta {
                    self.process_delta(delta).await;
                }
            }
        }
        None
    }

    /// Append a delta, re-parse, and publish whatever changed.
    ///
    /// Ordering: text delta first, then completed elements, then the new
    /// snapshot, so an element is never revealed by a snapshot before it
    /// appears on the element stream.
    async fn process_delta(&mut self, raw: String) {
        self.buffer.push_str(&raw);
        let parsed = parse_partial_json(&self.buffer);
        let update = self.strategy.partial(&parsed, &raw);

        if !update.text_delta.is_empty() {
            self.text_fork.publish(update.text_delta.clone()).await;
            self.full_fork
                .publish(ObjectStreamPart::TextDelta {
                    text_delta: update.text_delta,
                })
                .await;
        }

        for element in update.new_elements {
            if let Some(fork) = self.element_fork.as_mut() {
                fork.publish(element).await;
            }
        }

        if let Some(snapshot) = update.snapshot {
            if snapshot_changed(self.last_snapshot.as_ref(), &snapshot) {
                self.partial_fork.publish(snapshot.clone()).await;
                self.full_fork
                    .publish(ObjectStreamPart::Object {
                        object: snapshot.clone(),
                    })
                    .await;
                self.last_snapshot = Some(snapshot);
            }
        }
    }

    async fn finishing(&mut self, finish: FinishData) {
        let now_ms = (self.now)();
        let ms_to_finish = now_ms.saturating_sub(self.stream_start_ms);

        let outcome = match self.strategy.finalize(&self.buffer) {
            Ok(output) => {
                if !output.trailing_text.is_empty() {
                    self.text_fork.publish(output.trailing_text.clone()).await;
                    self.full_fork
                        .publish(ObjectStreamPart::TextDelta {
                            text_delta: output.trailing_text,
                        })
                        .await;
                }
                for element in output.trailing_elements {
                    if let Some(fork) = self.element_fork.as_mut() {
                        fork.publish(element).await;
                    }
                }
                self.object_cell.resolve(output.value.clone());
                if self.record_outputs {
                    if let Some(span) = self.outer_span.as_mut() {
                        span.set_attribute(keys::AI_RESPONSE_OBJECT, output.value.to_string());
                        span.set_attribute(keys::AI_RESULT_OBJECT, output.value.to_string());
                    }
                }
                Ok(output.value)
            }
            Err(no_object) => {
                let error =
                    StreamObjectError::NoObjectGenerated(no_object.with_usage(finish.usage));
                tracing::debug!(%error, "finalization failed");
                self.object_cell.reject(error.clone());
                if let Some(span) = self.outer_span.as_mut() {
                    span.record_error(error.to_string());
                }
                Err(error)
            }
        };

        let mut finish_attrs = Attributes::new();
        finish_attrs.insert(keys::AI_RESPONSE_MS_TO_FINISH.into(), ms_to_finish.into());
        if ms_to_finish > 0 {
            let avg = finish.usage.completion_tokens as f64 / (ms_to_finish as f64 / 1000.0);
            finish_attrs.insert(
                keys::AI_RESPONSE_AVG_COMPLETION_TOKENS_PER_SECOND.into(),
                avg.into(),
            );
        }
        if let Some(span) = self.inner_span.as_mut() {
            span.add_event(keys::EVENT_STREAM_FINISH, finish_attrs.clone());
            span.set_attributes(finish_attrs);
            span.set_attribute(keys::AI_RESPONSE_ID, self.response_id.clone());
            span.set_attributes(finish_reason_attributes(finish.finish_reason));
            span.set_attributes(usage_attributes(&finish.usage));
        }
        if let Some(span) = self.outer_span.as_mut() {
            span.set_attributes(finish_reason_attributes(finish.finish_reason));
            span.set_attributes(usage_attributes(&finish.usage));
        }

        self.full_fork
            .publish(ObjectStreamPart::Finish {
                finish_reason: finish.finish_reason,
                usage: finish.usage,
                provider_metadata: finish.provider_metadata.clone(),
                logprobs: finish.logprobs.clone(),
            })
            .await;

        self.usage_cell.resolve(finish.usage);
        self.finish_reason_cell.resolve(finish.finish_reason);
        self.provider_metadata_cell
            .resolve(finish.provider_metadata.clone());

        self.close_forks();
        let end_ms = (self.now)();
        if let Some(span) = self.inner_span.take() {
            span.end(end_ms);
        }
        if let Some(span) = self.outer_span.take() {
            span.end(end_ms);
        }

        if let Some(callback) = self.on_finish.take() {
            let (object, error) = match outcome {
                Ok(value) => (Some(value), None),
                Err(error) => (None, Some(error)),
            };
            callback(crate::options::FinishEvent {
                object,
                error,
                usage: finish.usage,
                finish_reason: finish.finish_reason,
                provider_metadata: finish.provider_metadata,
                warnings: self.warnings.clone(),
            });
        }
    }

    /// Hard upstream failure: everything rejects with the same error.
    async fn failed(&mut self, error: ProviderError) {
        tracing::debug!(%error, "upstream stream failed");
        let error = StreamObjectError::Provider(error);
        self.full_fork
            .publish(ObjectStreamPart::Error {
                error: error.clone(),
            })
            .await;
        self.reject_all(error.clone());
        self.close_forks();
        let end_ms = (self.now)();
        end_spans_with_error(
            self.outer_span.take(),
            self.inner_span.take(),
            &error.to_string(),
            end_ms,
        );
    }

    fn cancelled(&mut self) {
        tracing::debug!("stream_object call cancelled");
        self.reject_all(StreamObjectError::Cancelled);
        self.close_forks();
        let end_ms = (self.now)();
        end_spans_with_error(
            self.outer_span.take(),
            self.inner_span.take(),
            "stream cancelled",
            end_ms,
        );
    }

    fn reject_all(&self, error: StreamObjectError) {
        self.object_cell.reject(error.clone());
        self.usage_cell.reject(error.clone());
        self.finish_reason_cell.reject(error.clone());
        self.provider_metadata_cell.reject(error);
    }

    fn close_forks(&mut self) {
        self.text_fork.close();
        self.partial_fork.close();
        self.full_fork.close();
        if let Some(fork) = self.element_fork.as_mut() {
            fork.close();
        }
    }
}

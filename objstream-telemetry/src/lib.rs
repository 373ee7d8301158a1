//! # objstream-telemetry
//!
//! Telemetry for the objstream engine: a span model with deterministic
//! attribute ordering, tracers ([`InMemoryTracer`] for tests,
//! [`NoopTracer`] as the disabled sink), caller-facing
//! [`TelemetrySettings`] with input/output redaction, and assembly helpers
//! for the OpenTelemetry GenAI semantic conventions.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod attributes;
pub mod settings;
pub mod span;
pub mod tracer;

pub use attributes::{
    finish_reason_attributes, keys, model_attributes, operation_attributes, request_attributes,
    usage_attributes,
};
pub use settings::{TelemetryRecorder, TelemetrySettings};
pub use span::{AttributeValue, Attributes, SpanData, SpanEvent, SpanStatus};
pub use tracer::{BoxedTracer, InMemoryTracer, NoopTracer, Span, Tracer};

//! Tracers and live span handles.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::span::{AttributeValue, Attributes, SpanData, SpanEvent, SpanStatus};

/// Sink for finished spans.
pub trait Tracer: Send + Sync {
    /// Record one finished span.
    fn record(&self, span: SpanData);
}

/// A shared tracer.
pub type BoxedTracer = Arc<dyn Tracer>;

/// Tracer that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl Tracer for NoopTracer {
    fn record(&self, _span: SpanData) {}
}

/// Tracer that collects finished spans for assertions.
#[derive(Debug, Default)]
pub struct InMemoryTracer {
    spans: Mutex<Vec<SpanData>>,
}

impl InMemoryTracer {
    /// Create an empty tracer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All spans recorded so far, in completion order.
    pub fn finished_spans(&self) -> Vec<SpanData> {
        self.spans.lock().clone()
    }

    /// The recorded span with the given name, if any.
    pub fn span_named(&self, name: &str) -> Option<SpanData> {
        self.spans.lock().iter().find(|s| s.name == name).cloned()
    }
}

impl Tracer for InMemoryTracer {
    fn record(&self, span: SpanData) {
        self.spans.lock().push(span);
    }
}

/// A live span. Mutate it while the operation runs, then [`end`](Span::end)
/// it to hand the finished data to the tracer.
pub struct Span {
    data: SpanData,
    tracer: BoxedTracer,
}

impl Span {
    /// Start a span.
    #[must_use]
    pub fn start(
        tracer: BoxedTracer,
        name: impl Into<String>,
        parent: Option<String>,
        start_ms: u64,
    ) -> Self {
        Self {
            data: SpanData::new(name, parent, start_ms),
            tracer,
        }
    }

    /// Set one attribute.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.data.attributes.insert(key.into(), value.into());
    }

    /// Merge a batch of attributes, preserving their order.
    pub fn set_attributes(&mut self, attributes: Attributes) {
        self.data.attributes.extend(attributes);
    }

    /// Add an event.
    pub fn add_event(&mut self, name: impl Into<String>, attributes: Attributes) {
        self.data.events.push(SpanEvent {
            name: name.into(),
            attributes,
        });
    }

    /// Mark the span failed.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.data.status = SpanStatus::Error {
            message: message.into(),
        };
    }

    /// Finish the span and hand it to the tracer.
    pub fn end(mut self, end_ms: u64) {
        if self.data.status == SpanStatus::Unset {
            self.data.status = SpanStatus::Ok;
        }
        self.data.end_ms = Some(end_ms);
        self.tracer.record(self.data);
    }

    /// The span name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.data.name
    }
}

impl std::fmt::Debug for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Span")
            .field("data", &self.data)
            .field("tracer", &"<tracer>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_lifecycle() {
        let tracer = Arc::new(InMemoryTracer::new());
        let mut span = Span::start(tracer.clone(), "ai.streamObject", None, 10);
        span.set_attribute("ai.model.id", "test-model");
        span.add_event("ai.stream.firstChunk", Attributes::new());
        span.end(50);

        let spans = tracer.finished_spans();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].name, "ai.streamObject");
        assert_eq!(spans[0].status, SpanStatus::Ok);
        assert_eq!(spans[0].end_ms, Some(50));
        assert_eq!(spans[0].events.len(), 1);
    }

    #[test]
    fn test_error_status_sticks() {
        let tracer = Arc::new(InMemoryTracer::new());
        let mut span = Span::start(tracer.clone(), "op", None, 0);
        span.record_error("boom");
        span.end(1);
        assert_eq!(
            tracer.finished_spans()[0].status,
            SpanStatus::Error {
                message: "boom".into()
            }
        );
    }

    #[test]
    fn test_noop_tracer() {
        let span = Span::start(Arc::new(NoopTracer), "op", None, 0);
        span.end(1);
    }

    #[test]
    fn test_span_named() {
        let tracer = Arc::new(InMemoryTracer::new());
        Span::start(tracer.clone(), "outer", None, 0).end(1);
        Span::start(tracer.clone(), "inner", Some("outer".into()), 0).end(1);
        assert!(tracer.span_named("inner").is_some());
        assert_eq!(tracer.span_named("inner").unwrap().parent.as_deref(), Some("outer"));
        assert!(tracer.span_named("missing").is_none());
    }
}

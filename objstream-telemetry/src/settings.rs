//! Telemetry settings and the recorder gate.

use std::sync::Arc;

use crate::span::Attributes;
use crate::tracer::{BoxedTracer, NoopTracer, Span, Tracer};

/// Caller-facing telemetry configuration.
///
/// Disabled by default; when disabled no span is created at all.
/// `record_inputs` / `record_outputs` redact prompt/schema attributes and
/// response attributes respectively while keeping the spans themselves.
#[derive(Clone)]
pub struct TelemetrySettings {
    /// Whether telemetry is enabled.
    pub is_enabled: bool,
    /// Whether prompt and schema attributes are recorded.
    pub record_inputs: bool,
    /// Whether response attributes are recorded.
    pub record_outputs: bool,
    /// Identifier grouping spans of one logical function.
    pub function_id: Option<String>,
    /// Extra attributes recorded under `ai.telemetry.metadata.<key>`.
    pub metadata: Attributes,
    /// Where finished spans go.
    pub tracer: Option<BoxedTracer>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            is_enabled: false,
            record_inputs: true,
            record_outputs: true,
            function_id: None,
            metadata: Attributes::new(),
            tracer: None,
        }
    }
}

impl std::fmt::Debug for TelemetrySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetrySettings")
            .field("is_enabled", &self.is_enabled)
            .field("record_inputs", &self.record_inputs)
            .field("record_outputs", &self.record_outputs)
            .field("function_id", &self.function_id)
            .field("metadata", &self.metadata)
            .field("tracer", &self.tracer.as_ref().map(|_| "<tracer>"))
            .finish()
    }
}

impl TelemetrySettings {
    /// Enable telemetry with the given tracer.
    #[must_use]
    pub fn enabled(tracer: impl Tracer + 'static) -> Self {
        Self {
            is_enabled: true,
            tracer: Some(Arc::new(tracer)),
            ..Self::default()
        }
    }

    /// Enable telemetry with a shared tracer.
    #[must_use]
    pub fn enabled_with(tracer: BoxedTracer) -> Self {
        Self {
            is_enabled: true,
            tracer: Some(tracer),
            ..Self::default()
        }
    }

    /// Set whether inputs are recorded.
    #[must_use]
    pub fn with_record_inputs(mut self, record: bool) -> Self {
        self.record_inputs = record;
        self
    }

    /// Set whether outputs are recorded.
    #[must_use]
    pub fn with_record_outputs(mut self, record: bool) -> Self {
        self.record_outputs = record;
        self
    }

    /// Set the function id.
    #[must_use]
    pub fn with_function_id(mut self, function_id: impl Into<String>) -> Self {
        self.function_id = Some(function_id.into());
        self
    }

    /// Add one metadata entry.
    #[must_use]
    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<crate::span::AttributeValue>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Creates spans according to the settings; a disabled recorder creates
/// nothing.
#[derive(Clone)]
pub struct TelemetryRecorder {
    settings: TelemetrySettings,
    tracer: BoxedTracer,
}

impl TelemetryRecorder {
    /// Build a recorder from settings.
    #[must_use]
    pub fn new(settings: TelemetrySettings) -> Self {
        let tracer = settings
            .tracer
            .clone()
            .unwrap_or_else(|| Arc::new(NoopTracer));
        Self { settings, tracer }
    }

    /// Whether spans are being created.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.settings.is_enabled
    }

    /// Whether prompt/schema attributes should be recorded.
    #[must_use]
    pub fn record_inputs(&self) -> bool {
        self.settings.is_enabled && self.settings.record_inputs
    }

    /// Whether response attributes should be recorded.
    #[must_use]
    pub fn record_outputs(&self) -> bool {
        self.settings.is_enabled && self.settings.record_outputs
    }

    /// The settings this recorder was built from.
    #[must_use]
    pub fn settings(&self) -> &TelemetrySettings {
        &self.settings
    }

    /// Start a span, unless telemetry is disabled.
    #[must_use]
    pub fn start_span(
        &self,
        name: impl Into<String>,
        parent: Option<String>,
        start_ms: u64,
    ) -> Option<Span> {
        if !self.settings.is_enabled {
            return None;
        }
        Some(Span::start(self.tracer.clone(), name, parent, start_ms))
    }
}

impl std::fmt::Debug for TelemetryRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryRecorder")
            .field("settings", &self.settings)
            .finish()
    }
}

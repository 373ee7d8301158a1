//! Span data model.
//!
//! Attributes use an [`IndexMap`] so insertion order is stable: two runs
//! with identical inputs, clock, and id generator produce byte-identical
//! span dumps.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A span attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// String value.
    String(String),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// Array of strings.
    StringArray(Vec<String>),
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for AttributeValue {
    fn from(value: u64) -> Self {
        Self::Int(value as i64)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(value: Vec<String>) -> Self {
        Self::StringArray(value)
    }
}

/// Ordered attribute map.
pub type Attributes = IndexMap<String, AttributeValue>;

/// A timestamped event inside a span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanEvent {
    /// Event name.
    pub name: String,
    /// Event attributes.
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub attributes: Attributes,
}

/// Terminal status of a span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SpanStatus {
    /// Not set.
    Unset,
    /// Completed successfully.
    Ok,
    /// Completed with an error.
    Error {
        /// The error message.
        message: String,
    },
}

/// One finished span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanData {
    /// Span name.
    pub name: String,
    /// Name of the parent span, for nested spans.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Attributes, in insertion order.
    pub attributes: Attributes,
    /// Events, in emission order.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub events: Vec<SpanEvent>,
    /// Terminal status.
    pub status: SpanStatus,
    /// Start time, engine-clock milliseconds.
    pub start_ms: u64,
    /// End time, engine-clock milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_ms: Option<u64>,
}

impl SpanData {
    /// Create an open span.
    #[must_use]
    pub fn new(name: impl Into<String>, parent: Option<String>, start_ms: u64) -> Self {
        Self {
            name: name.into(),
            parent,
            attributes: Attributes::new(),
            events: Vec::new(),
            status: SpanStatus::Unset,
            start_ms,
            end_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_conversions() {
        assert_eq!(AttributeValue::from("x"), AttributeValue::String("x".into()));
        assert_eq!(AttributeValue::from(3u64), AttributeValue::Int(3));
        assert_eq!(AttributeValue::from(1.5), AttributeValue::Float(1.5));
        assert_eq!(AttributeValue::from(true), AttributeValue::Bool(true));
    }

    #[test]
    fn test_span_serde() {
        let mut span = SpanData::new("ai.streamObject", None, 100);
        span.attributes
            .insert("operation.name".into(), "ai.streamObject".into());
        span.status = SpanStatus::Ok;
        span.end_ms = Some(250);
        let json = serde_json::to_string(&span).unwrap();
        assert!(json.contains("\"operation.name\""));
        let parsed: SpanData = serde_json::from_str(&json).unwrap();
        assert_eq!(span, parsed);
    }

    #[test]
    fn test_attribute_order_is_preserved() {
        let mut attrs = Attributes::new();
        attrs.insert("z".into(), 1u64.into());
        attrs.insert("a".into(), 2u64.into());
        let keys: Vec<_> = attrs.keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }
}

//! Output strategies.
//!
//! One strategy per output shape. A strategy owns three operations: the
//! JSON schema sent to the provider, the mapping from a parsed buffer to
//! the current partial snapshot (plus, for arrays, newly completed
//! elements and the synthesized text delta), and final validation of the
//! accumulated text.

use serde_json::{json, Value};

use objstream_core::{InvalidArgumentError, OutputShape};

use crate::equality::deep_equal;
use crate::error::{NoObjectCause, NoObjectGeneratedError, TypeValidationError};
use crate::partial::ParsedJson;
use crate::schema::Schema;

/// What one parsed buffer contributes to the derived streams.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialUpdate {
    /// The current partial snapshot, when one exists.
    pub snapshot: Option<Value>,
    /// Array elements that just became complete, in index order.
    pub new_elements: Vec<Value>,
    /// What the text stream should emit for this chunk.
    pub text_delta: String,
}

/// What finalization contributes beyond the validated value.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalOutput {
    /// The validated final value.
    pub value: Value,
    /// Array elements not yet published mid-stream (always includes the
    /// last element).
    pub trailing_elements: Vec<Value>,
    /// Text still owed to the text stream (array closer etc.).
    pub trailing_text: String,
}

impl FinalOutput {
    fn plain(value: Value) -> Self {
        Self {
            value,
            trailing_elements: Vec::new(),
            trailing_text: String::new(),
        }
    }
}

/// Per-shape output behavior. The orchestrator owns the instance
/// exclusively; `partial` carries the array bookkeeping state.
pub trait OutputStrategy: Send {
    /// The shape this strategy implements.
    fn shape(&self) -> OutputShape;

    /// The JSON schema to send to the provider, if any.
    fn json_schema(&self) -> Option<Value>;

    /// Map a parsed buffer to snapshot / new elements / text delta.
    fn partial(&mut self, parsed: &ParsedJson, raw_delta: &str) -> PartialUpdate;

    /// Validate the accumulated text into the final value.
    fn finalize(&self, text: &str) -> Result<FinalOutput, NoObjectGeneratedError>;
}

/// Select the strategy for a shape, checking the schema requirement.
pub fn strategy_for(
    shape: OutputShape,
    schema: Option<Schema>,
) -> Result<Box<dyn OutputStrategy>, InvalidArgumentError> {
    match (shape, schema) {
        (OutputShape::Object, Some(schema)) => Ok(Box::new(ObjectStrategy { schema })),
        (OutputShape::Array, Some(schema)) => Ok(Box::new(ArrayStrategy {
            schema,
            published: 0,
            opened: false,
            element_error: None,
        })),
        (OutputShape::NoSchema, None) => Ok(Box::new(NoSchemaStrategy)),
        (OutputShape::Object | OutputShape::Array, None) => Err(InvalidArgumentError::new(
            "schema",
            format!("{shape} output requires a schema"),
        )),
        (OutputShape::NoSchema, Some(_)) => Err(InvalidArgumentError::new(
            "schema",
            "no-schema output cannot take a schema",
        )),
    }
}

fn parse_final(text: &str) -> Result<Value, NoObjectGeneratedError> {
    serde_json::from_str(text).map_err(|e| {
        NoObjectGeneratedError::new("response could not be parsed as JSON")
            .with_cause(NoObjectCause::JsonParse(e.to_string()))
            .with_text(text)
    })
}

/// Single object validated against the caller's schema.
struct ObjectStrategy {
    schema: Schema,
}

impl OutputStrategy for ObjectStrategy {
    fn shape(&self) -> OutputShape {
        OutputShape::Object
    }

    fn json_schema(&self) -> Option<Value> {
        Some(self.schema.json_schema().clone())
    }

    fn partial(&mut self, parsed: &ParsedJson, raw_delta: &str) -> PartialUpdate {
        PartialUpdate {
            snapshot: parsed.value.clone(),
            new_elements: Vec::new(),
            text_delta: raw_delta.to_string(),
        }
    }

    fn finalize(&self, text: &str) -> Result<FinalOutput, NoObjectGeneratedError> {
        let value = parse_final(text)?;
        let validated = self
            .schema
            .validate(&value)
            .map_err(|e| NoObjectGeneratedError::from(e).with_text(text))?;
        Ok(FinalOutput::plain(validated))
    }
}

/// Array of elements, each validated against the caller's schema.
///
/// The model is asked for `{"elements": [...]}`; the caller sees the bare
/// array. Element `i` counts as complete once element `i + 1` exists in the
/// repaired parse, so completion detection never depends on the parser's
/// repair internals. The text stream is synthesized from completed elements
/// rather than echoing the wrapper object.
struct ArrayStrategy {
    schema: Schema,
    published: usize,
    opened: bool,
    element_error: Option<TypeValidationError>,
}

impl OutputStrategy for ArrayStrategy {
    fn shape(&self) -> OutputShape {
        OutputShape::Array
    }

    fn json_schema(&self) -> Option<Value> {
        Some(json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "properties": {
                "elements": {
                    "type": "array",
                    "items": self.schema.json_schema().clone(),
                }
            },
            "required": ["elements"],
            "additionalProperties": false,
        }))
    }

    fn partial(&mut self, parsed: &ParsedJson, _raw_delta: &str) -> PartialUpdate {
        let elements = parsed
            .value
            .as_ref()
            .and_then(|v| v.get("elements"))
            .and_then(|v| v.as_array());
        let Some(elements) = elements else {
            return PartialUpdate::default();
        };

        let mut text_delta = String::new();
        if !self.opened {
            self.opened = true;
            text_delta.push('[');
        }

        let mut new_elements = Vec::new();
        let complete = elements.len().saturating_sub(1);
        while self.published < complete {
            let index = self.published;
            let element = &elements[index];
            if index > 0 {
                text_delta.push(',');
            }
            text_delta.push_str(&element.to_string());
            match self.schema.validate(element) {
                Ok(validated) if self.element_error.is_none() => new_elements.push(validated),
                Ok(_) => {}
                // Validation failures surface at finalize, never mid-stream.
                Err(err) => {
                    if self.element_error.is_none() {
                        self.element_error = Some(err);
                    }
                }
            }
            self.published += 1;
        }

        PartialUpdate {
            snapshot: Some(Value::Array(elements.clone())),
            new_elements,
            text_delta,
        }
    }

    fn finalize(&self, text: &str) -> Result<FinalOutput, NoObjectGeneratedError> {
        let value = parse_final(text)?;
        let elements = value
            .get("elements")
            .and_then(|v| v.as_array())
            .cloned()
            .ok_or_else(|| {
                NoObjectGeneratedError::new("response has no `elements` array").with_text(text)
            })?;

        let mut validated = Vec::with_capacity(elements.len());
        for element in &elements {
            match self.schema.validate(element) {
                Ok(v) => validated.push(v),
                Err(err) => return Err(NoObjectGeneratedError::from(err).with_text(text)),
            }
        }

        let mut trailing_text = String::new();
        if !self.opened {
            trailing_text.push('[');
        }
        let mut trailing_elements = Vec::with_capacity(elements.len() - self.published.min(elements.len()));
        for index in self.published..elements.len() {
            if index > 0 {
                trailing_text.push(',');
            }
            trailing_text.push_str(&elements[index].to_string());
            trailing_elements.push(validated[index].clone());
        }
        trailing_text.push(']');

        Ok(FinalOutput {
            value: Value::Array(validated),
            trailing_elements,
            trailing_text,
        })
    }
}

/// Free-form JSON; finalization is a plain parse.
struct NoSchemaStrategy;

impl OutputStrategy for NoSchemaStrategy {
    fn shape(&self) -> OutputShape {
        OutputShape::NoSchema
    }

    fn json_schema(&self) -> Option<Value> {
        None
    }

    fn partial(&mut self, parsed: &ParsedJson, raw_delta: &str) -> PartialUpdate {
        PartialUpdate {
            snapshot: parsed.value.clone(),
            new_elements: Vec::new(),
            text_delta: raw_delta.to_string(),
        }
    }

    fn finalize(&self, text: &str) -> Result<FinalOutput, NoObjectGeneratedError> {
        parse_final(text).map(FinalOutput::plain)
    }
}

/// Whether two successive snapshots differ.
#[must_use]
pub fn snapshot_changed(previous: Option<&Value>, next: &Value) -> bool {
    match previous {
        Some(previous) => !deep_equal(previous, next),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partial::parse_partial_json;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize)]
    struct Content {
        content: String,
    }

    fn content_schema() -> Schema {
        Schema::typed::<Content>(json!({
            "type": "object",
            "properties": {"content": {"type": "string"}},
            "required": ["content"]
        }))
    }

    #[test]
    fn test_object_requires_schema() {
        assert!(strategy_for(OutputShape::Object, None).is_err());
        assert!(strategy_for(OutputShape::Array, None).is_err());
        assert!(strategy_for(OutputShape::NoSchema, Some(content_schema())).is_err());
        assert!(strategy_for(OutputShape::NoSchema, None).is_ok());
    }

    #[test]
    fn test_object_partial_echoes_text() {
        let mut strategy = strategy_for(OutputShape::Object, Some(content_schema())).unwrap();
        let parsed = parse_partial_json(r#"{ "content": "Hel"#);
        let update = strategy.partial(&parsed, r#""Hel"#);
        assert_eq!(update.snapshot, Some(json!({"content": "Hel"})));
        assert_eq!(update.text_delta, r#""Hel"#);
        assert!(update.new_elements.is_empty());
    }

    #[test]
    fn test_object_finalize_validates() {
        let strategy = strategy_for(OutputShape::Object, Some(content_schema())).unwrap();
        let ok = strategy.finalize(r#"{"content": "Hello, world!"}"#).unwrap();
        assert_eq!(ok.value, json!({"content": "Hello, world!"}));

        let err = strategy.finalize(r#"{"invalid": "Hello, world!"}"#).unwrap_err();
        assert!(err.is_type_validation());
        assert_eq!(err.text.as_deref(), Some(r#"{"invalid": "Hello, world!"}"#));
    }

    #[test]
    fn test_object_finalize_rejects_unparseable() {
        let strategy = strategy_for(OutputShape::Object, Some(content_schema())).unwrap();
        let err = strategy.finalize("").unwrap_err();
        assert!(matches!(err.cause, Some(NoObjectCause::JsonParse(_))));
    }

    #[test]
    fn test_array_json_schema_wraps_elements() {
        let strategy = strategy_for(OutputShape::Array, Some(content_schema())).unwrap();
        let schema = strategy.json_schema().unwrap();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["elements"]));
        assert_eq!(schema["properties"]["elements"]["type"], "array");
    }

    #[test]
    fn test_array_lookahead_completion() {
        let mut strategy = strategy_for(OutputShape::Array, Some(content_schema())).unwrap();

        // Array open: synthesized "[" and an empty snapshot.
        let update = strategy.partial(&parse_partial_json(r#"{"elements":["#), "");
        assert_eq!(update.text_delta, "[");
        assert_eq!(update.snapshot, Some(json!([])));
        assert!(update.new_elements.is_empty());

        // First element present but last: not yet complete.
        let buffer = r#"{"elements":[{"content":"element 1"}"#;
        let update = strategy.partial(&parse_partial_json(buffer), "");
        assert_eq!(update.text_delta, "");
        assert_eq!(update.snapshot, Some(json!([{"content": "element 1"}])));
        assert!(update.new_elements.is_empty());

        // Second element appears: element 1 completes.
        let buffer = r#"{"elements":[{"content":"element 1"},{"content":"element 2"}"#;
        let update = strategy.partial(&parse_partial_json(buffer), "");
        assert_eq!(update.text_delta, r#"{"content":"element 1"}"#);
        assert_eq!(update.new_elements, vec![json!({"content": "element 1"})]);

        // Finalize publishes the rest.
        let text = r#"{"elements":[{"content":"element 1"},{"content":"element 2"}]}"#;
        let fin = strategy.finalize(text).unwrap();
        assert_eq!(
            fin.value,
            json!([{"content": "element 1"}, {"content": "element 2"}])
        );
        assert_eq!(fin.trailing_elements, vec![json!({"content": "element 2"})]);
        assert_eq!(fin.trailing_text, r#",{"content":"element 2"}]"#);
    }

    #[test]
    fn test_array_published_is_monotone() {
        let mut strategy = strategy_for(OutputShape::Array, Some(content_schema())).unwrap();
        let buffer = r#"{"elements":[{"content":"a"},{"content":"b"},{"content":"c"}"#;
        let update = strategy.partial(&parse_partial_json(buffer), "");
        assert_eq!(update.new_elements.len(), 2);

        // Re-running over the same buffer publishes nothing new.
        let update = strategy.partial(&parse_partial_json(buffer), "");
        assert!(update.new_elements.is_empty());
        assert_eq!(update.text_delta, "");
    }

    #[test]
    fn test_array_element_validation_failure_is_deferred() {
        let mut strategy = strategy_for(OutputShape::Array, Some(content_schema())).unwrap();
        let buffer = r#"{"elements":[{"bad": 1},{"content":"b"}"#;
        let update = strategy.partial(&parse_partial_json(buffer), "");
        // The invalid element is not emitted, and no error surfaces yet.
        assert!(update.new_elements.is_empty());

        let err = strategy
            .finalize(r#"{"elements":[{"bad": 1},{"content":"b"}]}"#)
            .unwrap_err();
        assert!(err.is_type_validation());
    }

    #[test]
    fn test_array_finalize_without_elements() {
        let strategy = strategy_for(OutputShape::Array, Some(content_schema())).unwrap();
        let err = strategy.finalize(r#"{"other": []}"#).unwrap_err();
        assert!(err.to_string().contains("elements"));
    }

    #[test]
    fn test_no_schema_finalize_is_plain_parse() {
        let strategy = strategy_for(OutputShape::NoSchema, None).unwrap();
        assert!(strategy.json_schema().is_none());
        let fin = strategy.finalize(r#"{"anything": [1, 2]}"#).unwrap();
        assert_eq!(fin.value, json!({"anything": [1, 2]}));
        assert!(strategy.finalize("not json").is_err());
    }

    #[test]
    fn test_snapshot_changed() {
        assert!(snapshot_changed(None, &json!({})));
        assert!(!snapshot_changed(Some(&json!({"a": 1})), &json!({"a": 1})));
        assert!(snapshot_changed(Some(&json!({"a": 1})), &json!({"a": 2})));
    }
}

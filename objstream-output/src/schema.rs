//! Schema descriptors.
//!
//! A [`Schema`] pairs a JSON Schema document (sent to the provider) with a
//! `validate` function (applied to decoded values). The engine treats the
//! pair as opaque: it forwards the document and calls the validator, nothing
//! else.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::error::TypeValidationError;

/// The validate half of a schema descriptor.
pub type ValidateFn = Arc<dyn Fn(&Value) -> Result<Value, TypeValidationError> + Send + Sync>;

/// A JSON Schema plus its validator.
#[derive(Clone)]
pub struct Schema {
    json_schema: Value,
    validate: ValidateFn,
}

impl Schema {
    /// Create a schema from a JSON Schema document and a validator.
    pub fn new(
        json_schema: Value,
        validate: impl Fn(&Value) -> Result<Value, TypeValidationError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            json_schema,
            validate: Arc::new(validate),
        }
    }

    /// Create a schema whose validator is a serde round-trip through `T`.
    ///
    /// Validation succeeds exactly when the value deserializes into `T`; the
    /// validated value is `T` re-serialized, so defaults and renames applied
    /// by `T`'s serde impls are reflected in the result.
    pub fn typed<T>(json_schema: Value) -> Self
    where
        T: DeserializeOwned + Serialize,
    {
        Self::new(json_schema, |value: &Value| {
            let typed: T = serde_json::from_value(value.clone())
                .map_err(|e| TypeValidationError::new(e.to_string(), value.clone()))?;
            serde_json::to_value(typed)
                .map_err(|e| TypeValidationError::new(e.to_string(), value.clone()))
        })
    }

    /// Create a schema that accepts any value unchanged.
    pub fn permissive(json_schema: Value) -> Self {
        Self::new(json_schema, |value: &Value| Ok(value.clone()))
    }

    /// The JSON Schema document.
    #[must_use]
    pub fn json_schema(&self) -> &Value {
        &self.json_schema
    }

    /// Run the validator.
    pub fn validate(&self, value: &Value) -> Result<Value, TypeValidationError> {
        (self.validate)(value)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("json_schema", &self.json_schema)
            .field("validate", &"<fn>")
            .finish()
    }
}

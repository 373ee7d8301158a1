//! Output shape and generation-mode vocabulary.
//!
//! The *shape* is the caller-facing contract (single object, array of
//! elements, free-form JSON). The *mode* is the provider-facing decoding
//! discipline (JSON emitted as text deltas vs. tool-call arguments).

use serde::{Deserialize, Serialize};
use std::fmt;

/// The caller-facing output contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputShape {
    /// A single object matching the caller's schema.
    #[default]
    Object,
    /// An array whose elements each match the caller's schema.
    Array,
    /// Free-form JSON with no schema validation.
    NoSchema,
}

impl fmt::Display for OutputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object => write!(f, "object"),
            Self::Array => write!(f, "array"),
            Self::NoSchema => write!(f, "no-schema"),
        }
    }
}

/// How the provider is asked to emit the JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectGenerationMode {
    /// The provider emits JSON text as plain text deltas.
    Json,
    /// The provider emits the JSON as tool-call arguments.
    Tool,
}

impl fmt::Display for ObjectGenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Tool => write!(f, "tool"),
        }
    }
}

/// The mode requested by the caller. `Auto` defers to the provider's
/// advertised default and falls back to [`ObjectGenerationMode::Json`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Use the provider's default object-generation mode.
    #[default]
    Auto,
    /// Force JSON-text mode.
    Json,
    /// Force tool-call mode.
    Tool,
}

impl Mode {
    /// Resolve the request against a provider default.
    #[must_use]
    pub fn resolve(self, provider_default: Option<ObjectGenerationMode>) -> ObjectGenerationMode {
        match self {
            Self::Json => ObjectGenerationMode::Json,
            Self::Tool => ObjectGenerationMode::Tool,
            Self::Auto => provider_default.unwrap_or(ObjectGenerationMode::Json),
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "json" => Ok(Self::Json),
            "tool" => Ok(Self::Tool),
            _ => Err(format!("Unknown mode: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_display() {
        assert_eq!(OutputShape::Object.to_string(), "object");
        assert_eq!(OutputShape::Array.to_string(), "array");
        assert_eq!(OutputShape::NoSchema.to_string(), "no-schema");
    }

    #[test]
    fn test_shape_serde() {
        let json = serde_json::to_string(&OutputShape::NoSchema).unwrap();
        assert_eq!(json, "\"no-schema\"");
    }

    #[test]
    fn test_mode_resolution() {
        assert_eq!(
            Mode::Auto.resolve(Some(ObjectGenerationMode::Tool)),
            ObjectGenerationMode::Tool
        );
        assert_eq!(Mode::Auto.resolve(None), ObjectGenerationMode::Json);
        assert_eq!(
            Mode::Json.resolve(Some(ObjectGenerationMode::Tool)),
            ObjectGenerationMode::Json
        );
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("auto".parse::<Mode>().unwrap(), Mode::Auto);
        assert_eq!("TOOL".parse::<Mode>().unwrap(), Mode::Tool);
        assert!("native".parse::<Mode>().is_err());
    }
}

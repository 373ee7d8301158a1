//! Mode adapters.
//!
//! A [`ModePlan`] binds a resolved generation mode to a concrete provider
//! [`CallMode`], the system line to inject (json mode on providers without
//! native structured outputs), and the rule for extracting the JSON text
//! substream from the provider's mixed fragment stream.

use serde_json::Value;

use objstream_core::{InvalidArgumentError, ObjectGenerationMode, OutputShape};
use objstream_provider::{CallMode, Fragment, ToolSpec};

/// Default tool name in tool mode.
pub const DEFAULT_TOOL_NAME: &str = "json";

/// Default tool description in tool mode.
pub const DEFAULT_TOOL_DESCRIPTION: &str = "Respond with a JSON object.";

/// System line injected in json mode when no schema is available.
pub const NO_SCHEMA_SYSTEM_PROMPT: &str = "You MUST answer with JSON.";

/// System line injected in json mode for providers without native
/// structured-output support.
#[must_use]
pub fn schema_system_prompt(schema: &Value) -> String {
    format!(
        "JSON schema:\n{schema}\nYou MUST answer with a JSON object that matches the JSON schema above."
    )
}

/// What a fragment contributes to the JSON text substream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaExtract<'a> {
    /// Part of the JSON text.
    Delta(&'a str),
    /// Text that the current mode discards (bare text deltas in tool mode).
    IgnoredText(&'a str),
    /// Not a text-bearing fragment.
    Other,
}

/// A resolved provider-call plan for one mode/shape combination.
#[derive(Debug, Clone, PartialEq)]
pub struct ModePlan {
    /// The resolved mode.
    pub mode: ObjectGenerationMode,
    /// The provider call mode.
    pub call_mode: CallMode,
    /// System message to prepend, when prompt augmentation is needed.
    pub inject_system: Option<String>,
}

impl ModePlan {
    /// Build the plan for a resolved mode.
    ///
    /// `json_schema` is what the output strategy sends to the model (`None`
    /// for the no-schema shape). Tool mode requires a schema, so
    /// `no-schema` with tool mode is rejected.
    pub fn build(
        mode: ObjectGenerationMode,
        shape: OutputShape,
        json_schema: Option<Value>,
        schema_name: Option<String>,
        schema_description: Option<String>,
        supports_structured_outputs: bool,
    ) -> Result<ModePlan, InvalidArgumentError> {
        match mode {
            ObjectGenerationMode::Json => {
                let inject_system = if supports_structured_outputs {
                    None
                } else {
                    Some(match &json_schema {
                        Some(schema) => schema_system_prompt(schema),
                        None => NO_SCHEMA_SYSTEM_PROMPT.to_string(),
                    })
                };
                Ok(ModePlan {
                    mode,
                    call_mode: CallMode::ObjectJson {
                        name: schema_name,
                        description: schema_description,
                        schema: json_schema,
                    },
                    inject_system,
                })
            }
            ObjectGenerationMode::Tool => {
                let Some(schema) = json_schema else {
                    return Err(InvalidArgumentError::new(
                        "mode",
                        format!("tool mode is not supported for {shape} output"),
                    ));
                };
                Ok(ModePlan {
                    mode,
                    call_mode: CallMode::ObjectTool {
                        tool: ToolSpec::function(
                            schema_name.unwrap_or_else(|| DEFAULT_TOOL_NAME.to_string()),
                            schema_description
                                .unwrap_or_else(|| DEFAULT_TOOL_DESCRIPTION.to_string()),
                            schema,
                        ),
                    },
                    inject_system: None,
                })
            }
        }
    }

    /// Extract this mode's JSON text from a fragment.
    #[must_use]
    pub fn extract_text_delta<'a>(&self, fragment: &'a Fragment) -> DeltaExtract<'a> {
        match (self.mode, fragment) {
            (ObjectGenerationMode::Json, Fragment::TextDelta { text_delta }) => {
                DeltaExtract::Delta(text_delta.as_str())
            }
            (ObjectGenerationMode::Tool, Fragment::ToolCallDelta { args_text_delta, .. }) => {
                DeltaExtract::Delta(args_text_delta.as_str())
            }
            (ObjectGenerationMode::Tool, Fragment::TextDelta { text_delta }) => {
                DeltaExtract::IgnoredText(text_delta.as_str())
            }
            _ => DeltaExtract::Other,
        }
    }
}

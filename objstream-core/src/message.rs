//! Prompt and message model.
//!
//! A caller supplies either a free-form prompt string or an ordered list of
//! messages; [`Prompt::standardize`] turns both into the normalized
//! `(InputFormat, Vec<Message>)` pair handed to the provider.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::InvalidArgumentError;

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// System instructions.
    System,
    /// End-user input.
    User,
    /// Model output.
    Assistant,
    /// Tool result carrier.
    Tool,
}

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    /// A URL the provider fetches itself.
    Url(String),
    /// Base64-encoded image bytes.
    Base64(String),
}

/// One typed part of a message body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ContentPart {
    /// Plain text.
    Text {
        /// The text content.
        text: String,
    },
    /// An image.
    Image {
        /// Image location or bytes.
        image: ImageSource,
        /// Optional media type, e.g. `image/png`.
        #[serde(skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },
    /// A tool call issued by the assistant.
    ToolCall {
        /// Provider-assigned call id.
        tool_call_id: String,
        /// Name of the tool.
        tool_name: String,
        /// JSON arguments.
        args: Value,
    },
    /// The result of a tool call.
    ToolResult {
        /// Id of the call being answered.
        tool_call_id: String,
        /// Name of the tool.
        tool_name: String,
        /// JSON result.
        result: Value,
    },
}

/// Message body: plain text or typed parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// A single text body.
    Text(String),
    /// A sequence of typed parts.
    Parts(Vec<ContentPart>),
}

/// A single prompt message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who produced it.
    pub role: Role,
    /// What it says.
    pub content: MessageContent,
}

impl Message {
    /// Create a system message.
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(text.into()),
        }
    }

    /// Create a user message.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    /// Create an assistant message.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Text(text.into()),
        }
    }

    /// Get the text content, if this is a plain-text message.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(t) => Some(t),
            MessageContent::Parts(_) => None,
        }
    }
}

/// How the caller originally phrased the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// A single free-form prompt string.
    Prompt,
    /// An explicit message list.
    Messages,
}

/// Caller-facing prompt: `system` plus exactly one of `prompt` / `messages`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    /// Optional system instructions, prepended as a system message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Free-form prompt text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Explicit message list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
}

/// Normalized prompt ready for a provider call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardizedPrompt {
    /// How the caller phrased it.
    pub input_format: InputFormat,
    /// The message list, system first when present.
    pub messages: Vec<Message>,
}

impl Prompt {
    /// Normalize into `(InputFormat, Vec<Message>)`.
    ///
    /// Exactly one of `prompt` / `messages` must be set.
    pub fn standardize(&self) -> Result<StandardizedPrompt, InvalidArgumentError> {
        match (&self.prompt, &self.messages) {
            (Some(_), Some(_)) => Err(InvalidArgumentError::new(
                "prompt",
                "prompt and messages cannot both be set",
            )),
            (None, None) => Err(InvalidArgumentError::new(
                "prompt",
                "either prompt or messages must be set",
            )),
            (Some(prompt), None) => {
                let mut messages = Vec::with_capacity(2);
                if let Some(system) = &self.system {
                    messages.push(Message::system(system.clone()));
                }
                messages.push(Message::user(prompt.clone()));
                Ok(StandardizedPrompt {
                    input_format: InputFormat::Prompt,
                    messages,
                })
            }
            (None, Some(list)) => {
                let mut messages = Vec::with_capacity(list.len() + 1);
                if let Some(system) = &self.system {
                    messages.push(Message::system(system.clone()));
                }
                messages.extend(list.iter().cloned());
                Ok(StandardizedPrompt {
                    input_format: InputFormat::Messages,
                    messages,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standardize_prompt() {
        let prompt = Prompt {
            system: Some("Be terse.".into()),
            prompt: Some("hello".into()),
            messages: None,
        };
        let std = prompt.standardize().unwrap();
        assert_eq!(std.input_format, InputFormat::Prompt);
        assert_eq!(std.messages.len(), 2);
        assert_eq!(std.messages[0].role, Role::System);
        assert_eq!(std.messages[1].text(), Some("hello"));
    }

    #[test]
    fn test_standardize_messages() {
        let prompt = Prompt {
            system: None,
            prompt: None,
            messages: Some(vec![Message::user("hi"), Message::assistant("hello")]),
        };
        let std = prompt.standardize().unwrap();
        assert_eq!(std.input_format, InputFormat::Messages);
        assert_eq!(std.messages.len(), 2);
    }

    #[test]
    fn test_standardize_rejects_both() {
        let prompt = Prompt {
            system: None,
            prompt: Some("hi".into()),
            messages: Some(vec![Message::user("hi")]),
        };
        assert!(prompt.standardize().is_err());
    }

    #[test]
    fn test_standardize_rejects_neither() {
        assert!(Prompt::default().standardize().is_err());
    }

    #[test]
    fn test_content_part_serde() {
        let part = ContentPart::Text {
            text: "hi".into(),
        };
        let json = serde_json::to_string(&part).unwrap();
        assert!(json.contains("\"type\":\"text\""));
    }
}

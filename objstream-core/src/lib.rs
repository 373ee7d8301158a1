//! # objstream-core
//!
//! Core types shared by the objstream workspace: the prompt/message model,
//! call settings, token usage accounting, finish reasons, output format
//! vocabulary, and id generation.
//!
//! This crate is dependency-light on purpose; everything wire-facing is a
//! plain serde type so transcripts and telemetry can serialize it.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod format;
pub mod identifier;
pub mod message;
pub mod settings;
pub mod usage;

pub use error::InvalidArgumentError;
pub use format::{Mode, ObjectGenerationMode, OutputShape};
pub use identifier::{generate_stream_id, generate_uuid, now_millis};
pub use message::{
    ContentPart, ImageSource, InputFormat, Message, MessageContent, Prompt, Role,
    StandardizedPrompt,
};
pub use settings::CallSettings;
pub use usage::{FinishReason, Usage};

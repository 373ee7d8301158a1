//! # objstream-streaming
//!
//! Streaming plumbing for the objstream engine: the bounded broadcast
//! [`StreamFork`] that tees one pump into independently-consumed derived
//! streams, the [`ObjectStreamPart`] full-stream vocabulary, awaitable
//! [`TerminalCell`]s for end-of-stream values, the engine error type, and
//! HTTP text-stream adapters.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod events;
pub mod fork;
pub mod response;
pub mod terminal;

pub use error::StreamObjectError;
pub use events::ObjectStreamPart;
pub use fork::{ForkStream, StreamFork, DEFAULT_BUFFER_CAPACITY};
pub use response::{pipe_text_stream_to, TextStreamResponse, TEXT_STREAM_CONTENT_TYPE};
pub use terminal::TerminalCell;

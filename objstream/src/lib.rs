//! # objstream
//!
//! A streaming structured-output engine for language models. Given a
//! prompt, a schema descriptor, and a streaming provider, a call produces
//! four concurrent, backpressure-respecting derived streams (raw text,
//! partial object snapshots, completed array elements, and a full
//! multiplexed event stream) plus awaitable terminal values: the validated
//! object, token usage, finish reason, and provider metadata, along with a
//! GenAI semantic-convention span tree.
//!
//! ## Quick start
//!
//! ```rust
//! use futures::StreamExt;
//! use objstream::prelude::*;
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Recipe {
//!     name: String,
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), StreamObjectError> {
//! // Any `LanguageModel` works; the mock replays a scripted stream.
//! let model = MockLanguageModel::new("test-model").with_fragments(vec![
//!     Fragment::text_delta(r#"{"name": "Lasa"#),
//!     Fragment::text_delta(r#"gne"}"#),
//!     Fragment::finish(FinishReason::Stop, Usage::new(3, 10)),
//! ]);
//!
//! let schema = Schema::typed::<Recipe>(json!({
//!     "type": "object",
//!     "properties": {"name": {"type": "string"}},
//!     "required": ["name"]
//! }));
//!
//! let mut result = stream_object(
//!     StreamObjectOptions::new(model)
//!         .with_schema(schema)
//!         .with_prompt("Generate a lasagne recipe."),
//! )
//! .await?;
//!
//! while let Some(partial) = result.partial_object_stream.next().await {
//!     println!("partial: {partial}");
//! }
//! let recipe: Recipe = result.object_as().await?;
//! assert_eq!(recipe.name, "Lasagne");
//! # Ok(())
//! # }
//! ```
//!
//! ## Workspace
//!
//! - [`objstream_core`]: prompt/message model, settings, usage, ids
//! - [`objstream_provider`]: the `LanguageModel` contract and mock
//! - [`objstream_output`]: partial-JSON parser, schemas, strategies, modes
//! - [`objstream_streaming`]: stream fan-out, events, terminal cells
//! - [`objstream_telemetry`]: span model, tracers, GenAI semconv

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod options;
mod result;
mod stream_object;

pub use options::{
    EngineInternals, FinishCallback, FinishEvent, IdFn, NowFn, StreamObjectOptions,
};
pub use result::{
    ElementStream, FullStream, PartialObjectStream, StreamObjectResult, TextStream,
};
pub use stream_object::stream_object;

pub use objstream_core::{
    CallSettings, FinishReason, InputFormat, InvalidArgumentError, Message, Mode,
    ObjectGenerationMode, OutputShape, Prompt, Role, Usage,
};
pub use objstream_output::{
    deep_equal, parse_partial_json, NoObjectCause, NoObjectGeneratedError, ParseState, ParsedJson,
    Schema, TypeValidationError,
};
pub use objstream_provider::{
    CallMode, CallOptions, CallWarning, Fragment, LanguageModel, MockLanguageModel, ProviderError,
    RawResponse, StreamResponse, ToolSpec,
};
pub use objstream_streaming::{
    ObjectStreamPart, StreamObjectError, TextStreamResponse, DEFAULT_BUFFER_CAPACITY,
};
pub use objstream_telemetry::{
    AttributeValue, InMemoryTracer, NoopTracer, SpanData, TelemetrySettings, Tracer,
};

/// Common imports for engine users.
pub mod prelude {
    pub use crate::{
        stream_object, CallSettings, FinishReason, Fragment, LanguageModel, Message, Mode,
        MockLanguageModel, ObjectStreamPart, OutputShape, Schema, StreamObjectError,
        StreamObjectOptions, StreamObjectResult, TelemetrySettings, Usage,
    };
}

//! The call result: four derived streams plus awaitable terminal values.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::io::AsyncWrite;
use tokio_util::sync::CancellationToken;

use objstream_core::{FinishReason, Usage};
use objstream_provider::{CallWarning, RawResponse};
use objstream_streaming::{
    pipe_text_stream_to, ForkStream, ObjectStreamPart, StreamObjectError, TerminalCell,
    TextStreamResponse,
};

/// Successive distinct partial snapshots.
pub type PartialObjectStream = ForkStream<Value>;

/// The decoded JSON text, delta by delta.
pub type TextStream = ForkStream<String>;

/// Completed top-level array elements, exactly once each, in index order.
pub type ElementStream = ForkStream<Value>;

/// Ordered multiplex of text deltas, snapshots, errors, and the terminal
/// finish event.
pub type FullStream = ForkStream<ObjectStreamPart>;

/// Result of [`stream_object`](crate::stream_object).
///
/// The four streams consume independently through bounded buffers; take the
/// ones you need and drop the rest. Dropping a stream unsubscribes it, it
/// does not cancel the call; use [`cancel`](Self::cancel) for that.
/// Terminal accessors resolve once the stream has run to completion.
pub struct StreamObjectResult {
    /// Successive distinct partial snapshots.
    pub partial_object_stream: PartialObjectStream,
    /// The decoded JSON text.
    pub text_stream: TextStream,
    /// Completed array elements; present only for the array shape.
    pub element_stream: Option<ElementStream>,
    /// Everything, multiplexed and ordered.
    pub full_stream: FullStream,
    /// Provider warnings from call setup.
    pub warnings: Vec<CallWarning>,
    /// Transport metadata, when the provider exposes it.
    pub raw_response: Option<RawResponse>,
    pub(crate) object: TerminalCell<Value>,
    pub(crate) usage: TerminalCell<Usage>,
    pub(crate) finish_reason: TerminalCell<FinishReason>,
    pub(crate) provider_metadata: TerminalCell<Option<Value>>,
    pub(crate) cancel: CancellationToken,
}

impl StreamObjectResult {
    /// The validated final value.
    ///
    /// Rejects with `NoObjectGenerated` when the accumulated text does not
    /// finalize, `Cancelled` on cancellation, or the transport error on a
    /// hard failure. Never awaiting this is fine; the rejection is inert.
    pub async fn object(&self) -> Result<Value, StreamObjectError> {
        self.object.get().await
    }

    /// The validated final value, deserialized into `T`.
    pub async fn object_as<T: DeserializeOwned>(&self) -> Result<T, StreamObjectError> {
        let value = self.object.get().await?;
        serde_json::from_value(value).map_err(|e| StreamObjectError::Other(e.to_string()))
    }

    /// Final token usage.
    pub async fn usage(&self) -> Result<Usage, StreamObjectError> {
        self.usage.get().await
    }

    /// Why the provider stopped.
    pub async fn finish_reason(&self) -> Result<FinishReason, StreamObjectError> {
        self.finish_reason.get().await
    }

    /// Provider metadata from the finish fragment.
    pub async fn provider_metadata(&self) -> Result<Option<Value>, StreamObjectError> {
        self.provider_metadata.get().await
    }

    /// Cancel the call: the upstream pump stops, streams close, and
    /// terminal values reject with `Cancelled`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Turn the text stream into a `200 text/plain; charset=utf-8`
    /// streaming HTTP response.
    #[must_use]
    pub fn into_text_stream_response(self) -> TextStreamResponse {
        TextStreamResponse::new(self.text_stream)
    }

    /// Write the text stream into a writer, chunk by chunk, then shut the
    /// writer down.
    pub async fn pipe_text_stream_to<W>(self, writer: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        pipe_text_stream_to(self.text_stream, writer).await
    }
}

impl std::fmt::Debug for StreamObjectResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamObjectResult")
            .field("warnings", &self.warnings)
            .field("raw_response", &self.raw_response)
            .field("element_stream", &self.element_stream.is_some())
            .finish_non_exhaustive()
    }
}

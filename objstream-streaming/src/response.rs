//! HTTP adapters for the text stream.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Status and headers used for text-stream responses.
pub const TEXT_STREAM_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// A framework-neutral streaming HTTP response.
///
/// Adapters for specific servers only need to copy the status, headers, and
/// body stream into their own response type.
pub struct TextStreamResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Vec<(String, String)>,
    /// UTF-8 body chunks.
    pub body: Pin<Box<dyn Stream<Item = Bytes> + Send>>,
}

impl TextStreamResponse {
    /// Wrap a text stream as a `200 text/plain; charset=utf-8` response.
    pub fn new(text: impl Stream<Item = String> + Send + 'static) -> Self {
        Self {
            status: 200,
            headers: vec![(
                "content-type".to_string(),
                TEXT_STREAM_CONTENT_TYPE.to_string(),
            )],
            body: Box::pin(text.map(Bytes::from)),
        }
    }
}

impl std::fmt::Debug for TextStreamResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextStreamResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body", &"<stream>")
            .finish()
    }
}

/// Write every text chunk to a writer, then shut it down.
///
/// This is the Node-style `pipe(res)` shape: chunks are flushed as they
/// arrive and the writer is ended when the stream completes.
pub async fn pipe_text_stream_to<W>(
    mut text: impl Stream<Item = String> + Unpin,
    writer: &mut W,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(chunk) = text.next().await {
        writer.write_all(chunk.as_bytes()).await?;
        writer.flush().await?;
    }
    writer.shutdown().await
}

//! SSE parser for LangGraph run streams.
//!
//! The backend frames run output as standard SSE (`event:` name plus `data:`
//! JSON). This wraps a byte stream and yields one [`RunChunk`] per event.

use std::pin::Pin;

use eventsource_stream::{EventStream, Eventsource};
use futures_util::Stream;
use serde_json::Value;

use super::types::RunChunk;
use crate::error::{GatewayError, GatewayResult};

/// SSE parser that converts a run's byte stream into `RunChunk`s.
pub struct RunStreamParser<S> {
    inner: EventStream<S>,
}

impl<S> RunStreamParser<S> {
    pub fn new(stream: S) -> Self
    where
        S: Eventsource,
    {
        Self {
            inner: stream.eventsource(),
        }
    }
}

impl<S, E> Stream for RunStreamParser<S>
where
    S: Stream<Item = std::result::Result<bytes::Bytes, E>> + Unpin,
    E: std::error::Error + Send + Sync + 'static,
{
    type Item = GatewayResult<RunChunk>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        use std::task::Poll;

        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => {
                    let trimmed = event.data.trim();
                    if trimmed.is_empty() || trimmed == "[DONE]" {
                        continue;
                    }
                    let chunk = serde_json::from_str::<Value>(trimmed)
                        .map_err(|err| {
                            GatewayError::parse(format!("Failed to parse run event JSON: {err}"))
                        })
                        .map(|data| RunChunk {
                            event: event.event,
                            data,
                        });
                    return Poll::Ready(Some(chunk));
                }
                Poll::Ready(Some(Err(e))) => {
                    return Poll::Ready(Some(Err(GatewayError::upstream(format!(
                        "SSE stream error: {e}"
                    )))));
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;

    use super::*;
    use crate::error::GatewayErrorKind;

    /// SSE fixture simulating a typical run stream
    const RUN_STREAM: &str = "event: metadata\n\
data: {\"run_id\":\"run_1\"}\n\
\n\
event: values\n\
data: {\"messages\":[{\"type\":\"human\",\"content\":\"hi\"}]}\n\
\n\
event: values\n\
data: {\"messages\":[{\"type\":\"human\",\"content\":\"hi\"},{\"type\":\"ai\",\"content\":\"hello\"}]}\n\
\n\
event: end\n\
data: {}\n\
\n";

    /// Helper to create a mock byte stream from a string
    fn mock_byte_stream(
        data: &str,
        chunk_size: usize,
    ) -> impl Stream<Item = std::result::Result<bytes::Bytes, std::io::Error>> {
        let chunks: Vec<_> = data
            .as_bytes()
            .chunks(chunk_size)
            .map(|c| Ok(bytes::Bytes::copy_from_slice(c)))
            .collect();
        futures_util::stream::iter(chunks)
    }

    #[tokio::test]
    async fn test_run_stream_parses_all_chunks() {
        let mut parser = RunStreamParser::new(mock_byte_stream(RUN_STREAM, 50));

        let mut chunks = Vec::new();
        while let Some(result) = parser.next().await {
            chunks.push(result.expect("valid chunk"));
        }

        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].event, "metadata");
        assert_eq!(chunks[1].event, "values");
        assert_eq!(
            chunks[2].data["messages"].as_array().map(Vec::len),
            Some(2)
        );
        assert_eq!(chunks[3].event, "end");
    }

    #[tokio::test]
    async fn test_run_stream_handles_tiny_chunks() {
        let mut parser = RunStreamParser::new(mock_byte_stream(RUN_STREAM, 7));

        let mut count = 0;
        while let Some(result) = parser.next().await {
            result.expect("valid chunk");
            count += 1;
        }
        assert_eq!(count, 4);
    }

    #[tokio::test]
    async fn test_run_stream_invalid_json_is_an_error() {
        let body = "event: values\ndata: {broken\n\n";
        let mut parser = RunStreamParser::new(mock_byte_stream(body, 64));

        let err = parser.next().await.unwrap().unwrap_err();
        assert_eq!(err.kind, GatewayErrorKind::Parse);
    }
}

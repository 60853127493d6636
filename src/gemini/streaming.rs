// Server-sent event parsing for streamGenerateContent
// Author: kelexine (https://github.com/kelexine)

use crate::error::{GemkitError, Result};
use crate::models::gemini::GenerateContentResponse;
use futures::stream::Stream;
use futures::StreamExt;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Ordered stream of response chunks.
pub type ResponseStream = Pin<Box<dyn Stream<Item = Result<GenerateContentResponse>> + Send>>;

/// Wrap a raw SSE byte stream into a cancellable [`ResponseStream`].
pub(crate) fn response_stream<S>(byte_stream: S, cancel: CancellationToken) -> ResponseStream
where
    S: Stream<Item = reqwest::Result<bytes::Bytes>> + Send + 'static,
{
    Box::pin(parse_sse_stream(byte_stream, cancel))
}

/// Parse an SSE byte stream into response chunks.
///
/// Events are separated by a blank line. The stream ends when the transport
/// ends, on the first error, or as soon as `cancel` fires; nothing is
/// yielded after cancellation has been observed.
pub fn parse_sse_stream<S, E>(
    byte_stream: S,
    cancel: CancellationToken,
) -> impl Stream<Item = Result<GenerateContentResponse>> + Send
where
    S: Stream<Item = std::result::Result<bytes::Bytes, E>> + Send + 'static,
    E: Into<GemkitError> + Send + 'static,
{
    async_stream::stream! {
        let mut buffer: Vec<u8> = Vec::new();
        futures::pin_mut!(byte_stream);

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Gemini SSE stream cancelled");
                    break;
                }
                next = byte_stream.next() => next,
            };

            let chunk = match next {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    let err: GemkitError = e.into();
                    warn!("Stream error: {}", err);
                    yield Err(err);
                    break;
                }
                None => break,
            };

            // Reads may split multi-byte characters, so bytes are buffered
            // and only whole events are decoded. Raw CR only appears in
            // line endings.
            buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

            let mut failed = false;
            while let Some(event_end) = find_event_end(&buffer) {
                let event: Vec<u8> = buffer.drain(..event_end + 2).collect();

                if let Some(parsed) = decode_event(&event[..event_end]) {
                    if cancel.is_cancelled() {
                        break;
                    }
                    failed = parsed.is_err();
                    yield parsed;
                    if failed {
                        break;
                    }
                }
            }
            if failed || cancel.is_cancelled() {
                buffer.clear();
                break;
            }
        }

        // The last event may arrive without a trailing blank line.
        if !buffer.iter().all(u8::is_ascii_whitespace) && !cancel.is_cancelled() {
            if let Some(parsed) = decode_event(&buffer) {
                yield parsed;
            }
        }

        debug!("Gemini SSE stream ended");
    }
}

fn find_event_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

fn decode_event(event: &[u8]) -> Option<Result<GenerateContentResponse>> {
    match std::str::from_utf8(event) {
        Ok(event) => parse_sse_event(event),
        Err(e) => {
            warn!("SSE event is not valid UTF-8: {}", e);
            Some(Err(GemkitError::Translation(format!(
                "SSE event is not valid UTF-8: {}",
                e
            ))))
        }
    }
}

/// Parse a single SSE event.
///
/// Returns `None` for events without a payload (comments, keep-alives,
/// `[DONE]`), and an error for a payload that is not a response chunk.
pub fn parse_sse_event(event: &str) -> Option<Result<GenerateContentResponse>> {
    let data = event
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");

    if data.is_empty() || data == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<GenerateContentResponse>(&data) {
        Ok(response) => Some(Ok(response)),
        Err(e) => {
            warn!("Failed to parse SSE chunk: {}", e);
            debug!("Raw data: {}", data.chars().take(200).collect::<String>());
            Some(Err(GemkitError::Json(e)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn chunk(text: &str) -> String {
        format!(
            "data: {{\"candidates\":[{{\"content\":{{\"role\":\"model\",\"parts\":[{{\"text\":\"{}\"}}]}}}}]}}\n\n",
            text
        )
    }

    fn byte_stream(
        parts: Vec<String>,
    ) -> impl Stream<Item = std::result::Result<Bytes, GemkitError>> + Send + 'static {
        futures::stream::iter(parts.into_iter().map(|p| Ok(Bytes::from(p))))
    }

    fn text_of(response: &GenerateContentResponse) -> String {
        response.candidates[0]
            .content
            .as_ref()
            .and_then(|c| c.parts[0].as_text())
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn test_parse_sse_event() {
        let event = "event: message\ndata: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\" Hello\"}]}}]}";
        let result = parse_sse_event(event).unwrap().unwrap();
        assert_eq!(text_of(&result), " Hello");
    }

    #[test]
    fn test_parse_sse_event_no_data() {
        assert!(parse_sse_event("event: ping").is_none());
        assert!(parse_sse_event(": keep-alive").is_none());
        assert!(parse_sse_event("data: [DONE]").is_none());
    }

    #[test]
    fn test_parse_sse_event_malformed() {
        let result = parse_sse_event("data: {not json").unwrap();
        assert!(matches!(result, Err(GemkitError::Json(_))));
    }

    #[tokio::test]
    async fn test_events_split_across_reads() {
        let whole = format!("{}{}", chunk("a"), chunk("b"));
        let (first, second) = whole.split_at(17);
        let stream = parse_sse_stream(
            byte_stream(vec![first.to_string(), second.to_string()]),
            CancellationToken::new(),
        );

        let texts: Vec<String> = stream
            .map(|r| text_of(&r.unwrap()))
            .collect()
            .await;
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_crlf_and_missing_trailing_separator() {
        let last = chunk("tail").trim_end().to_string();
        let stream = parse_sse_stream(
            byte_stream(vec![chunk("head").replace('\n', "\r\n"), last]),
            CancellationToken::new(),
        );

        let texts: Vec<String> = stream
            .map(|r| text_of(&r.unwrap()))
            .collect()
            .await;
        assert_eq!(texts, vec!["head", "tail"]);
    }

    #[tokio::test]
    async fn test_malformed_event_ends_stream() {
        let stream = parse_sse_stream(
            byte_stream(vec![
                chunk("ok"),
                "data: {broken\n\n".to_string(),
                chunk("never"),
            ]),
            CancellationToken::new(),
        );

        let results: Vec<_> = stream.collect().await;
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[tokio::test]
    async fn test_multibyte_character_split_across_reads() {
        let bytes = chunk("héllo 日本").into_bytes();
        let split = bytes.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let reads = vec![
            Ok(Bytes::copy_from_slice(&bytes[..split])),
            Ok(Bytes::copy_from_slice(&bytes[split..])),
        ];
        let stream = parse_sse_stream(
            futures::stream::iter::<Vec<std::result::Result<Bytes, GemkitError>>>(reads),
            CancellationToken::new(),
        );

        let texts: Vec<String> = stream
            .map(|r| text_of(&r.unwrap()))
            .collect()
            .await;
        assert_eq!(texts, vec!["héllo 日本"]);
    }

    #[tokio::test]
    async fn test_invalid_utf8_event_ends_stream() {
        let mut invalid = b"data: {\"candidates\":[]}".to_vec();
        invalid.insert(8, 0xFF);
        invalid.extend_from_slice(b"\n\n");
        let reads = vec![
            Ok(Bytes::from(chunk("ok"))),
            Ok(Bytes::from(invalid)),
            Ok(Bytes::from(chunk("never"))),
        ];
        let stream = parse_sse_stream(
            futures::stream::iter::<Vec<std::result::Result<Bytes, GemkitError>>>(reads),
            CancellationToken::new(),
        );

        let results: Vec<_> = stream.collect().await;
        assert_eq!(results.len(), 2);
        assert!(matches!(results[1], Err(GemkitError::Translation(_))));
    }

    #[tokio::test]
    async fn test_cancelled_before_start_yields_nothing() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let stream = parse_sse_stream(byte_stream(vec![chunk("a")]), cancel);

        let results: Vec<_> = stream.collect().await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_mid_stream() {
        let cancel = CancellationToken::new();
        let parts = (0..5).map(|i| chunk(&i.to_string())).collect();
        let stream = parse_sse_stream(byte_stream(parts), cancel.clone());
        futures::pin_mut!(stream);

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(text_of(&first), "0");
        cancel.cancel();
        assert!(stream.next().await.is_none());
    }
}

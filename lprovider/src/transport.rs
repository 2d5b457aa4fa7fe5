//! Upstream transport contract and line framing for streamed bodies.

use std::pin::Pin;

use futures_core::Stream;

use crate::{UpstreamError, UpstreamFuture, UpstreamPayload};

pub type LineStream<'a> = Pin<Box<dyn Stream<Item = Result<String, UpstreamError>> + Send + 'a>>;

/// Status and full body of a blocking upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

/// Status of a streaming upstream call plus its body, line by line.
pub struct StreamingResponse<'a> {
    pub status: u16,
    pub lines: LineStream<'a>,
}

impl std::fmt::Debug for StreamingResponse<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Issues calls against the fixed chat-completion endpoint.
///
/// Implementations never retry. Connection-level failures (timeout, reset,
/// DNS, TLS) surface as `Err`, never as an empty body or empty line stream.
pub trait UpstreamTransport: Send + Sync + std::fmt::Debug {
    fn call_blocking<'a>(
        &'a self,
        payload: UpstreamPayload,
    ) -> UpstreamFuture<'a, Result<UpstreamResponse, UpstreamError>>;

    fn call_streaming<'a>(
        &'a self,
        payload: UpstreamPayload,
    ) -> UpstreamFuture<'a, Result<StreamingResponse<'a>, UpstreamError>>;
}

/// Splits arbitrary byte chunks into `\n`-terminated lines.
///
/// Bytes are buffered until a newline arrives, so multi-byte UTF-8 sequences
/// split across chunks decode intact. A trailing `\r` is stripped.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(index) = self.pending.iter().position(|byte| *byte == b'\n') {
            let raw = self.pending.drain(..=index).collect::<Vec<_>>();
            lines.push(decode_line_bytes(&raw[..raw.len() - 1]));
        }

        lines
    }

    /// Returns the unterminated remainder, if any.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }

        let raw = std::mem::take(&mut self.pending);
        Some(decode_line_bytes(&raw))
    }
}

fn decode_line_bytes(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::LineBuffer;

    #[test]
    fn line_buffer_joins_lines_across_chunks() {
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(b"data: {\"a\"").is_empty());
        assert_eq!(buffer.push(b":1}\n\ndata: [DO"), vec!["data: {\"a\":1}", ""]);
        assert_eq!(buffer.push(b"NE]\r\n"), vec!["data: [DONE]"]);
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn line_buffer_keeps_split_utf8_intact() {
        let text = "data: 你好\n".as_bytes();
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(&text[..8]).is_empty());
        assert_eq!(buffer.push(&text[8..]), vec!["data: 你好"]);
    }

    #[test]
    fn line_buffer_flushes_unterminated_tail() {
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(b"data: [DONE]").is_empty());
        assert_eq!(buffer.finish(), Some("data: [DONE]".to_string()));
        assert_eq!(buffer.finish(), None);
    }
}

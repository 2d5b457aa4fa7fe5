//! Incremental decoding of the upstream `data: <json>` event stream.
//!
//! ```rust
//! use lprovider::{StreamEvent, decode_line};
//!
//! let delta = decode_line(r#"data: {"choices":[{"delta":{"content":"hi"}}]}"#);
//! assert_eq!(delta, Some(StreamEvent::ContentDelta("hi".into())));
//! assert_eq!(decode_line("data: [DONE]"), Some(StreamEvent::Done));
//! assert_eq!(decode_line(": keep-alive"), None);
//! ```

use std::pin::Pin;

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;

use crate::serde_api::StreamChunk;
use crate::{LineStream, UpstreamError};

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_SENTINEL: &str = "[DONE]";

/// One decoded upstream event. Consumed immediately, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    ContentDelta(String),
    Done,
    /// A `data:` line whose payload did not parse; carries the raw line.
    Malformed(String),
}

pub type SseEventStream<'a> =
    Pin<Box<dyn Stream<Item = Result<StreamEvent, UpstreamError>> + Send + 'a>>;

/// Decodes a single line. Returns `None` for lines that carry no event.
pub fn decode_line(line: &str) -> Option<StreamEvent> {
    let payload = line.strip_prefix(DATA_PREFIX)?.trim();

    if payload == DONE_SENTINEL {
        return Some(StreamEvent::Done);
    }

    match serde_json::from_str::<StreamChunk>(payload) {
        Ok(chunk) => chunk
            .into_first_content()
            .filter(|content| !content.is_empty())
            .map(StreamEvent::ContentDelta),
        Err(_) => Some(StreamEvent::Malformed(line.to_string())),
    }
}

/// Drives [`decode_line`] over a line stream.
///
/// The returned stream ends right after `Done`, or when the line stream ends.
/// Line-level transport errors are passed through and end the stream.
pub fn decode_lines<'a>(mut lines: LineStream<'a>) -> SseEventStream<'a> {
    let stream = try_stream! {
        while let Some(line) = lines.next().await {
            let line = line?;
            match decode_line(&line) {
                Some(StreamEvent::Done) => {
                    yield StreamEvent::Done;
                    break;
                }
                Some(event) => yield event,
                None => {}
            }
        }
    };

    Box::pin(stream)
}

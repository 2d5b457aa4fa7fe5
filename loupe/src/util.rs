//! Small convenience constructors for common request shapes.

use lchat::{ChatRequest, DEFAULT_HISTORY_LIMIT};
use lprovider::ImageAttachment;

pub fn chat_request(text: impl Into<String>) -> ChatRequest {
    ChatRequest::new(text)
}

pub fn screenshot_request(
    text: impl Into<String>,
    bytes: impl Into<Vec<u8>>,
    mime_type: impl Into<String>,
) -> ChatRequest {
    ChatRequest::new(text).with_attachment(ImageAttachment::new(bytes, mime_type))
}

/// Reads a `limit` query value. Absent or unparsable values use the default.
pub fn parse_history_limit(value: Option<&str>) -> i64 {
    value
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
}

//! Caller-facing request, reply and event types.

use std::pin::Pin;

use futures_core::Stream;
use lprovider::ImageAttachment;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::{ChatError, ChatTurn};

pub const STATUS_SUCCESS: &str = "success";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub text: String,
    pub client_timestamp: Option<String>,
    pub attachment: Option<ImageAttachment>,
}

impl ChatRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            client_timestamp: None,
            attachment: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.client_timestamp = Some(timestamp.into());
        self
    }

    pub fn with_attachment(mut self, attachment: ImageAttachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn validate(&self) -> Result<(), ChatError> {
        if self.text.is_empty() {
            return Err(ChatError::invalid_request("message must not be empty"));
        }

        if let Some(attachment) = &self.attachment {
            if !attachment.is_image() {
                return Err(ChatError::invalid_request(format!(
                    "attachment must be an image, got `{}`",
                    attachment.mime_type
                )));
            }
        }

        Ok(())
    }
}

/// Body of the blocking chat surface. `message` and `reply` carry the same text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub message: String,
    pub reply: String,
    pub timestamp: String,
    pub status: &'static str,
}

impl ChatReply {
    pub fn new(reply: impl Into<String>, timestamp: impl Into<String>) -> Self {
        let reply = reply.into();
        Self {
            message: reply.clone(),
            reply,
            timestamp: timestamp.into(),
            status: STATUS_SUCCESS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryPage {
    pub messages: Vec<ChatTurn>,
    pub total: usize,
    pub status: &'static str,
}

/// One record of the streaming surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    UserSaved { message: String },
    Processing { message: String },
    Content { content: String },
    Done { message: String },
    Error { error: String },
}

impl ChatEvent {
    pub fn user_saved(message: impl Into<String>) -> Self {
        Self::UserSaved {
            message: message.into(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::Processing {
            message: message.into(),
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self::Content {
            content: content.into(),
        }
    }

    pub fn done(message: impl Into<String>) -> Self {
        Self::Done {
            message: message.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Error { .. })
    }

    fn parts(&self) -> (Option<&'static str>, &'static str, &str) {
        match self {
            Self::UserSaved { message } => (Some("user_saved"), "message", message),
            Self::Processing { message } => (Some("processing"), "message", message),
            Self::Content { content } => (Some("content"), "content", content),
            Self::Done { message } => (Some("done"), "message", message),
            Self::Error { error } => (None, "error", error),
        }
    }

    /// Wire framing: `data: ` + compact JSON + blank line.
    pub fn to_sse_frame(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => format!("data: {json}\n\n"),
            Err(_) => "data: {\"error\":\"event encoding failed\"}\n\n".to_string(),
        }
    }
}

// `type` is written first; serde_json's default map would sort the keys.
impl Serialize for ChatEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let (kind, field, value) = self.parts();
        let mut map = serializer.serialize_map(Some(1 + usize::from(kind.is_some())))?;
        if let Some(kind) = kind {
            map.serialize_entry("type", kind)?;
        }
        map.serialize_entry(field, value)?;
        map.end()
    }
}

impl From<ChatError> for ChatEvent {
    fn from(value: ChatError) -> Self {
        Self::Error {
            error: value.message,
        }
    }
}

/// Events end with exactly one terminal record; dropping the stream cancels
/// the in-flight upstream call.
pub type ChatEventStream = Pin<Box<dyn Stream<Item = ChatEvent> + Send + 'static>>;

#[cfg(test)]
mod tests {
    use lprovider::ImageAttachment;
    use serde_json::json;

    use super::*;
    use crate::ChatErrorKind;

    #[test]
    fn sse_frames_match_wire_format() {
        assert_eq!(
            ChatEvent::content("a\"b").to_sse_frame(),
            "data: {\"type\":\"content\",\"content\":\"a\\\"b\"}\n\n"
        );
        assert_eq!(
            ChatEvent::user_saved("saved").to_sse_frame(),
            "data: {\"type\":\"user_saved\",\"message\":\"saved\"}\n\n"
        );
        assert_eq!(
            ChatEvent::done("ok").to_sse_frame(),
            "data: {\"type\":\"done\",\"message\":\"ok\"}\n\n"
        );
        assert_eq!(
            ChatEvent::from(ChatError::invalid_request("nope")).to_sse_frame(),
            "data: {\"error\":\"nope\"}\n\n"
        );
    }

    #[test]
    fn terminal_events_are_done_and_error() {
        assert!(ChatEvent::done("x").is_terminal());
        assert!(ChatEvent::Error { error: "x".into() }.is_terminal());
        assert!(!ChatEvent::content("x").is_terminal());
        assert!(!ChatEvent::processing("x").is_terminal());
    }

    #[test]
    fn reply_mirrors_text_in_message_and_reply() {
        let reply = ChatReply::new("hello", "t1");
        let value = serde_json::to_value(&reply).expect("reply serializes");
        assert_eq!(
            value,
            json!({"message": "hello", "reply": "hello", "timestamp": "t1", "status": "success"})
        );
    }

    #[test]
    fn validate_rejects_empty_text_and_non_image_attachments() {
        let empty = ChatRequest::new("").validate().expect_err("empty must fail");
        assert_eq!(empty.kind, ChatErrorKind::InvalidRequest);
        assert!(ChatRequest::new("  \n").validate().is_ok());

        let pdf = ChatRequest::new("look")
            .with_attachment(ImageAttachment::new(b"%PDF".to_vec(), "application/pdf"))
            .validate()
            .expect_err("pdf must fail");
        assert_eq!(pdf.kind, ChatErrorKind::InvalidRequest);
        assert_eq!(pdf.http_status(), 400);

        assert!(
            ChatRequest::new("look")
                .with_attachment(ImageAttachment::new(vec![1], "image/webp"))
                .validate()
                .is_ok()
        );
    }
}

//! Request body sent to the upstream chat-completion endpoint.
//!
//! ```rust
//! use lprovider::{ImageAttachment, UpstreamPayload};
//!
//! let text_only = UpstreamPayload::text("gemini-2.5-pro-thinking", "hello");
//! assert!(!text_only.stream);
//!
//! let screenshot = ImageAttachment::new(vec![1, 2, 3], "image/png");
//! let with_image = UpstreamPayload::with_image("gemini-2.5-pro-thinking", "what is this?", &screenshot)
//!     .expect("png is an image")
//!     .streaming();
//! assert!(with_image.stream);
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use crate::UpstreamError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpstreamPayload {
    pub model: String,
    pub messages: Vec<UpstreamMessage>,
    pub stream: bool,
}

impl UpstreamPayload {
    pub fn text(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![UpstreamMessage::user(MessageContent::Text(text.into()))],
            stream: false,
        }
    }

    pub fn with_image(
        model: impl Into<String>,
        text: impl Into<String>,
        image: &ImageAttachment,
    ) -> Result<Self, UpstreamError> {
        let image_part = ContentPart::image_url(image.data_uri()?);
        let parts = vec![ContentPart::text(text), image_part];

        Ok(Self {
            model: model.into(),
            messages: vec![UpstreamMessage::user(MessageContent::Parts(parts))],
            stream: false,
        })
    }

    pub fn streaming(mut self) -> Self {
        self.stream = true;
        self
    }

    pub fn blocking(mut self) -> Self {
        self.stream = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpstreamMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

impl UpstreamMessage {
    pub fn user(content: MessageContent) -> Self {
        Self {
            role: "user",
            content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrl { url: url.into() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Raw screenshot bytes plus their declared MIME type.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImageAttachment {
    pub fn new(bytes: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.trim().starts_with("image/")
    }

    /// MIME subtype, e.g. `png` for `image/png`.
    pub fn subtype(&self) -> &str {
        self.mime_type
            .trim()
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }

    pub fn data_uri(&self) -> Result<String, UpstreamError> {
        if !self.is_image() {
            return Err(UpstreamError::invalid_payload(format!(
                "attachment must be an image, got `{}`",
                self.mime_type
            )));
        }

        Ok(format!(
            "data:image/{};base64,{}",
            self.subtype(),
            STANDARD.encode(&self.bytes)
        ))
    }
}

impl std::fmt::Debug for ImageAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAttachment")
            .field("bytes", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::UpstreamErrorKind;

    #[test]
    fn text_payload_serializes_plain_string_content() {
        let payload = UpstreamPayload::text("m", "hello").streaming();
        let value = serde_json::to_value(&payload).expect("payload should serialize");

        assert_eq!(
            value,
            json!({
                "model": "m",
                "messages": [{"role": "user", "content": "hello"}],
                "stream": true
            })
        );
    }

    #[test]
    fn image_payload_serializes_text_then_image_part() {
        let image = ImageAttachment::new(b"abc".to_vec(), "image/jpeg");
        let payload = UpstreamPayload::with_image("m", "describe", &image).expect("image payload");
        let value = serde_json::to_value(&payload).expect("payload should serialize");

        assert_eq!(
            value["messages"][0]["content"],
            json!([
                {"type": "text", "text": "describe"},
                {"type": "image_url", "image_url": {"url": "data:image/jpeg;base64,YWJj"}}
            ])
        );
        assert_eq!(value["stream"], json!(false));
    }

    #[test]
    fn non_image_attachment_is_rejected() {
        let pdf = ImageAttachment::new(b"%PDF".to_vec(), "application/pdf");
        let error = UpstreamPayload::with_image("m", "describe", &pdf).expect_err("pdf must fail");
        assert_eq!(error.kind, UpstreamErrorKind::InvalidPayload);
        assert!(!error.retryable);
    }

    #[test]
    fn debug_hides_attachment_bytes() {
        let image = ImageAttachment::new(vec![7_u8; 2048], "image/png");
        let rendered = format!("{image:?}");
        assert!(rendered.contains("2048"));
        assert!(rendered.contains("image/png"));
        assert!(!rendered.contains("7, 7"));
    }
}

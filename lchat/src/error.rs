//! Chat-layer errors and classification.

use std::error::Error;
use std::fmt::{Display, Formatter};

use lprovider::UpstreamError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    /// Rejected before any upstream work: empty text, non-image attachment.
    InvalidRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidRequest, message)
    }

    /// HTTP status an ingestion boundary should answer with.
    pub fn http_status(&self) -> u16 {
        match self.kind {
            ChatErrorKind::InvalidRequest => 400,
        }
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ChatError {}

/// Only payload construction errors reach this conversion. Upstream failures
/// become degraded replies instead.
impl From<UpstreamError> for ChatError {
    fn from(value: UpstreamError) -> Self {
        ChatError::invalid_request(value.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_errors_become_client_errors() {
        let error = ChatError::from(UpstreamError::invalid_payload("attachment must be an image"));
        assert_eq!(error.kind, ChatErrorKind::InvalidRequest);
        assert_eq!(error.message, "attachment must be an image");
        assert_eq!(error.http_status(), 400);
    }
}

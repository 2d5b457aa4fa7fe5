//! Upstream error kinds and error value helpers.
//!
//! ```rust
//! use lprovider::UpstreamError;
//!
//! let auth = UpstreamError::from_status(401, r#"{"error":{"message":"bad key"}}"#);
//! assert!(!auth.retryable);
//! assert_eq!(auth.message, "bad key");
//!
//! let overloaded = UpstreamError::from_status(503, "");
//! assert!(overloaded.retryable);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::serde_api::extract_error_message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    Authentication,
    Unavailable,
    HttpStatus,
    Timeout,
    Connect,
    Transport,
    EmptyReply,
    InvalidPayload,
    Decode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamError {
    pub kind: UpstreamErrorKind,
    pub message: String,
    pub status: Option<u16>,
    pub retryable: bool,
}

impl UpstreamError {
    pub fn new(kind: UpstreamErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            retryable,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(UpstreamErrorKind::Authentication, message, false)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(UpstreamErrorKind::Unavailable, message, true)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(UpstreamErrorKind::Timeout, message, true)
    }

    pub fn connect(message: impl Into<String>) -> Self {
        Self::new(UpstreamErrorKind::Connect, message, true)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(UpstreamErrorKind::Transport, message, true)
    }

    pub fn empty_reply() -> Self {
        Self::new(
            UpstreamErrorKind::EmptyReply,
            "upstream returned an empty reply",
            true,
        )
    }

    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::new(UpstreamErrorKind::InvalidPayload, message, false)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(UpstreamErrorKind::Decode, message, true)
    }

    /// Classifies a non-200 upstream response.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = extract_error_message(body)
            .unwrap_or_else(|| format!("upstream request failed with status {status}"));

        let error = match status {
            401 | 403 => Self::authentication(message),
            503 => Self::unavailable(message),
            _ => Self::new(UpstreamErrorKind::HttpStatus, message, true),
        };

        error.with_status(status)
    }
}

impl Display for UpstreamError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{:?} (HTTP {status}): {}", self.kind, self.message),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for UpstreamError {}

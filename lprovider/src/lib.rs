//! Upstream side of the loupe gateway.
//!
//! Builds chat-completion payloads, talks to the single fixed upstream
//! endpoint, decodes its `data: <json>` stream, and decides when a failed
//! attempt is worth repeating.
//!
//! ```rust
//! use lprovider::{RetryOutcome, RetryPolicy, UpstreamError};
//!
//! let policy = RetryPolicy::default();
//! let outcome = policy.classify(Err(UpstreamError::from_status(401, "")));
//! assert!(matches!(outcome, RetryOutcome::FatalFailure(_)));
//! ```

mod attempt;
mod credentials;
mod error;
#[cfg(feature = "http-client")]
mod http;
mod payload;
mod resilience;
mod serde_api;
mod sse;
mod transport;

pub use attempt::{blocking_attempt, streaming_attempt};
pub use credentials::SecretString;
pub use error::{UpstreamError, UpstreamErrorKind};
#[cfg(feature = "http-client")]
pub use http::{
    DEFAULT_BLOCKING_TIMEOUT, DEFAULT_STREAMING_TIMEOUT, HttpUpstreamClient, UpstreamClientConfig,
};
pub use payload::{ContentPart, ImageAttachment, ImageUrl, MessageContent, UpstreamMessage, UpstreamPayload};
pub use resilience::{
    DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY, NoopOperationHooks, RetryOutcome, RetryPolicy,
    UpstreamOperationHooks, execute_with_retry,
};
pub use serde_api::parse_completion_content;
pub use sse::{DATA_PREFIX, DONE_SENTINEL, SseEventStream, StreamEvent, decode_line, decode_lines};
pub use transport::{LineBuffer, LineStream, StreamingResponse, UpstreamResponse, UpstreamTransport};

pub type UpstreamFuture<'a, T> = lcommon::BoxFuture<'a, T>;

pub mod prelude {
    pub use crate::{
        ImageAttachment, NoopOperationHooks, RetryOutcome, RetryPolicy, SecretString,
        StreamEvent, UpstreamError, UpstreamErrorKind, UpstreamFuture, UpstreamOperationHooks,
        UpstreamPayload, UpstreamTransport,
    };
}

//! Tracing-based observability hooks for upstream calls.
//!
//! ```rust
//! use lobserve::TracingObservabilityHooks;
//! use lprovider::UpstreamOperationHooks;
//!
//! fn accepts_upstream_hooks(_hooks: &dyn UpstreamOperationHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_upstream_hooks(&hooks);
//! ```

use std::time::Duration;

use lprovider::{UpstreamError, UpstreamOperationHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl UpstreamOperationHooks for TracingObservabilityHooks {
    fn on_attempt_start(&self, operation: &str, attempt: u32) {
        tracing::info!(phase = "upstream", event = "attempt_start", operation, attempt);
    }

    fn on_retry_scheduled(
        &self,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &UpstreamError,
    ) {
        tracing::warn!(
            phase = "upstream",
            event = "retry_scheduled",
            operation,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error_kind = ?error.kind,
            status = error.status,
            retryable = error.retryable,
            error = %error
        );
    }

    fn on_success(&self, operation: &str, attempts: u32) {
        tracing::info!(phase = "upstream", event = "success", operation, attempts);
    }

    fn on_failure(&self, operation: &str, attempts: u32, error: &UpstreamError) {
        tracing::error!(
            phase = "upstream",
            event = "failure",
            operation,
            attempts,
            error_kind = ?error.kind,
            status = error.status,
            retryable = error.retryable,
            error = %error
        );
    }

    fn on_decode_noise(&self, operation: &str, raw_line: &str) {
        tracing::debug!(phase = "upstream", event = "decode_noise", operation, raw_line);
    }

    fn on_stream_truncated(&self, operation: &str, received_chars: usize, error: &UpstreamError) {
        tracing::warn!(
            phase = "upstream",
            event = "stream_truncated",
            operation,
            received_chars,
            error_kind = ?error.kind,
            error = %error
        );
    }
}

//! Metrics-based observability hooks for upstream calls.
//!
//! ```rust
//! use lobserve::MetricsObservabilityHooks;
//! use lprovider::UpstreamOperationHooks;
//!
//! fn accepts_upstream_hooks(_hooks: &dyn UpstreamOperationHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_upstream_hooks(&hooks);
//! ```

use std::time::Duration;

use lprovider::{UpstreamError, UpstreamOperationHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl UpstreamOperationHooks for MetricsObservabilityHooks {
    fn on_attempt_start(&self, operation: &str, _attempt: u32) {
        metrics::counter!(
            "loupe_upstream_attempt_start_total",
            "operation" => operation.to_string()
        )
        .increment(1);
    }

    fn on_retry_scheduled(
        &self,
        operation: &str,
        _attempt: u32,
        delay: Duration,
        error: &UpstreamError,
    ) {
        metrics::counter!(
            "loupe_upstream_retry_scheduled_total",
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "loupe_upstream_retry_delay_seconds",
            "operation" => operation.to_string()
        )
        .record(delay.as_secs_f64());
    }

    fn on_success(&self, operation: &str, attempts: u32) {
        metrics::counter!(
            "loupe_upstream_success_total",
            "operation" => operation.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "loupe_upstream_attempts_per_success",
            "operation" => operation.to_string()
        )
        .record(attempts as f64);
    }

    fn on_failure(&self, operation: &str, attempts: u32, error: &UpstreamError) {
        metrics::counter!(
            "loupe_upstream_failure_total",
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "loupe_upstream_attempts_per_failure",
            "operation" => operation.to_string()
        )
        .record(attempts as f64);
    }

    fn on_decode_noise(&self, operation: &str, _raw_line: &str) {
        metrics::counter!(
            "loupe_upstream_decode_noise_total",
            "operation" => operation.to_string()
        )
        .increment(1);
    }

    fn on_stream_truncated(&self, operation: &str, received_chars: usize, error: &UpstreamError) {
        metrics::counter!(
            "loupe_upstream_stream_truncated_total",
            "operation" => operation.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "loupe_upstream_truncated_chars",
            "operation" => operation.to_string()
        )
        .record(received_chars as f64);
    }
}

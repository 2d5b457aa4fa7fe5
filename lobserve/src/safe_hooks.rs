use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use lprovider::{UpstreamError, UpstreamOperationHooks};

/// Swallows panics raised by the wrapped hooks so a faulty observer cannot
/// abort a chat request.
#[derive(Debug, Clone, Default)]
pub struct SafeUpstreamHooks<H> {
    inner: H,
}

impl<H> SafeUpstreamHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<H> UpstreamOperationHooks for SafeUpstreamHooks<H>
where
    H: UpstreamOperationHooks,
{
    fn on_attempt_start(&self, operation: &str, attempt: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_attempt_start(operation, attempt)
        }));
    }

    fn on_retry_scheduled(
        &self,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &UpstreamError,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_retry_scheduled(operation, attempt, delay, error)
        }));
    }

    fn on_success(&self, operation: &str, attempts: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_success(operation, attempts)
        }));
    }

    fn on_failure(&self, operation: &str, attempts: u32, error: &UpstreamError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_failure(operation, attempts, error)
        }));
    }

    fn on_decode_noise(&self, operation: &str, raw_line: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_decode_noise(operation, raw_line)
        }));
    }

    fn on_stream_truncated(&self, operation: &str, received_chars: usize, error: &UpstreamError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_stream_truncated(operation, received_chars, error)
        }));
    }
}

//! Fixed-delay retry policy, outcome classification and operational hook contracts.

use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;

use crate::UpstreamError;

pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Result of one attempt, or of a whole retry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome {
    Success(String),
    TransientFailure(UpstreamError),
    FatalFailure(UpstreamError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
    pub fatal_statuses: BTreeSet<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: DEFAULT_RETRY_DELAY,
            fatal_statuses: BTreeSet::from([401, 403]),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Marks an additional HTTP status as never worth retrying.
    pub fn with_fatal_status(mut self, status: u16) -> Self {
        self.fatal_statuses.insert(status);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Classifies the result of a single attempt. Only a zero-length reply is
    /// empty; whitespace is content the caller may already have received.
    pub fn classify(&self, result: Result<String, UpstreamError>) -> RetryOutcome {
        match result {
            Ok(reply) if !reply.is_empty() => RetryOutcome::Success(reply),
            Ok(_) => RetryOutcome::TransientFailure(UpstreamError::empty_reply()),
            Err(error) if self.is_fatal(&error) => RetryOutcome::FatalFailure(error),
            Err(error) => RetryOutcome::TransientFailure(error),
        }
    }

    pub fn is_fatal(&self, error: &UpstreamError) -> bool {
        !error.retryable
            || error
                .status
                .is_some_and(|status| self.fatal_statuses.contains(&status))
    }

    pub fn should_retry(&self, attempt: u32, outcome: &RetryOutcome) -> bool {
        matches!(outcome, RetryOutcome::TransientFailure(_)) && attempt < self.max_attempts()
    }
}

pub trait UpstreamOperationHooks: Send + Sync {
    fn on_attempt_start(&self, _operation: &str, _attempt: u32) {}

    fn on_retry_scheduled(
        &self,
        _operation: &str,
        _attempt: u32,
        _delay: Duration,
        _error: &UpstreamError,
    ) {
    }

    fn on_success(&self, _operation: &str, _attempts: u32) {}

    fn on_failure(&self, _operation: &str, _attempts: u32, _error: &UpstreamError) {}

    fn on_decode_noise(&self, _operation: &str, _raw_line: &str) {}

    fn on_stream_truncated(&self, _operation: &str, _received_chars: usize, _error: &UpstreamError) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOperationHooks;

impl UpstreamOperationHooks for NoopOperationHooks {}

/// Runs `execute` until it succeeds, fails fatally, or attempts run out.
///
/// The returned outcome is always `Success` or `FatalFailure`; exhausted
/// transient failures become `FatalFailure` carrying the last error.
pub async fn execute_with_retry<Op, OpFuture, Sleep, SleepFuture>(
    operation: &str,
    policy: &RetryPolicy,
    hooks: &dyn UpstreamOperationHooks,
    mut execute: Op,
    mut sleep: Sleep,
) -> RetryOutcome
where
    Op: FnMut(u32) -> OpFuture,
    OpFuture: Future<Output = Result<String, UpstreamError>>,
    Sleep: FnMut(Duration) -> SleepFuture,
    SleepFuture: Future<Output = ()>,
{
    let mut attempt = 1;

    loop {
        hooks.on_attempt_start(operation, attempt);

        let outcome = policy.classify(execute(attempt).await);
        let retry = policy.should_retry(attempt, &outcome);
        match outcome {
            RetryOutcome::Success(reply) => {
                hooks.on_success(operation, attempt);
                return RetryOutcome::Success(reply);
            }
            RetryOutcome::TransientFailure(error) if retry => {
                hooks.on_retry_scheduled(operation, attempt, policy.delay, &error);
                sleep(policy.delay).await;
                attempt += 1;
            }
            RetryOutcome::TransientFailure(error) | RetryOutcome::FatalFailure(error) => {
                hooks.on_failure(operation, attempt, &error);
                return RetryOutcome::FatalFailure(error);
            }
        }
    }
}

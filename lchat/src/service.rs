//! Chat orchestration for the blocking and streaming surfaces.
//!
//! Every accepted request logs exactly one user turn and, unless the caller
//! abandons the stream, exactly one assistant turn. Upstream failures never
//! reach the caller as errors: once retries are exhausted (or a fatal error
//! short-circuits them) the assistant turn is a degraded reply that names the
//! last failure.

use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use futures_timer::Delay;
use lcommon::{Clock, SystemClock};
use lprovider::{
    NoopOperationHooks, RetryOutcome, RetryPolicy, UpstreamOperationHooks, UpstreamPayload,
    UpstreamTransport, blocking_attempt, execute_with_retry, streaming_attempt,
};
use tokio::sync::mpsc;

use crate::degrade::{degraded_reply, split_words};
use crate::{
    ChatError, ChatEvent, ChatEventStream, ChatReply, ChatRequest, ChatTurn, ConversationLog,
    HistoryPage, InMemoryConversationLog, STATUS_SUCCESS, TurnDraft,
};

pub const DEFAULT_MODEL: &str = "gemini-2.5-pro-thinking";
pub const DEFAULT_DEGRADED_WORD_DELAY: Duration = Duration::from_millis(40);
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

pub const USER_SAVED_MESSAGE: &str = "message saved";
pub const PROCESSING_MESSAGE: &str = "generating reply";
pub const DONE_MESSAGE: &str = "reply complete";

const COMPLETE_OPERATION: &str = "complete";
const STREAM_OPERATION: &str = "stream";

/// Per-service knobs. Timeouts live on the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPolicy {
    pub model: String,
    pub retry: RetryPolicy,
    /// Pause between words of a streamed degraded reply. Zero disables it.
    pub degraded_word_delay: Duration,
}

impl Default for ChatPolicy {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            retry: RetryPolicy::default(),
            degraded_word_delay: DEFAULT_DEGRADED_WORD_DELAY,
        }
    }
}

#[derive(Clone)]
pub struct ChatService {
    transport: Arc<dyn UpstreamTransport>,
    log: Arc<dyn ConversationLog>,
    hooks: Arc<dyn UpstreamOperationHooks>,
    policy: ChatPolicy,
}

impl ChatService {
    pub fn new(transport: Arc<dyn UpstreamTransport>, log: Arc<dyn ConversationLog>) -> Self {
        Self::builder(transport).log(log).build()
    }

    pub fn builder(transport: Arc<dyn UpstreamTransport>) -> ChatServiceBuilder {
        ChatServiceBuilder::new(transport)
    }

    pub fn log(&self) -> &Arc<dyn ConversationLog> {
        &self.log
    }

    pub fn policy(&self) -> &ChatPolicy {
        &self.policy
    }

    /// Blocking surface: one reply per request, retried per the policy.
    pub async fn send_chat(&self, request: ChatRequest) -> Result<ChatReply, ChatError> {
        let payload = self.prepare(&request)?;
        self.log_user_turn(request);

        let transport = self.transport.as_ref();
        let outcome = execute_with_retry(
            COMPLETE_OPERATION,
            &self.policy.retry,
            self.hooks.as_ref(),
            |_attempt| blocking_attempt(transport, payload.clone()),
            Delay::new,
        )
        .await;

        let reply = match outcome {
            RetryOutcome::Success(reply) => reply,
            RetryOutcome::TransientFailure(error) | RetryOutcome::FatalFailure(error) => {
                degraded_reply(&error)
            }
        };

        let turn = self.log.append(TurnDraft::assistant(reply.clone()));
        Ok(ChatReply::new(reply, turn.created_at))
    }

    /// Streaming surface.
    ///
    /// Validation happens before anything is logged, so an `Err` here means no
    /// turn was recorded. The user turn is logged before this returns; the
    /// stream then yields `user_saved`, `processing`, the reply as `content`
    /// fragments, and finally `done` after the assistant turn is logged.
    pub fn stream_chat(&self, request: ChatRequest) -> Result<ChatEventStream, ChatError> {
        let payload = self.prepare(&request)?;
        self.log_user_turn(request);

        let service = self.clone();
        Ok(Box::pin(stream! {
            yield ChatEvent::user_saved(USER_SAVED_MESSAGE);
            yield ChatEvent::processing(PROCESSING_MESSAGE);

            let (delta_tx, mut delta_rx) = mpsc::unbounded_channel::<String>();
            let transport = service.transport.as_ref();
            let hooks = service.hooks.as_ref();

            let mut retry = std::pin::pin!(execute_with_retry(
                STREAM_OPERATION,
                &service.policy.retry,
                hooks,
                |_attempt| {
                    let delta_tx = delta_tx.clone();
                    streaming_attempt(transport, payload.clone(), STREAM_OPERATION, hooks, move |delta| {
                        let _ = delta_tx.send(delta);
                    })
                },
                Delay::new,
            ));

            let outcome = loop {
                let step = tokio::select! {
                    biased;
                    Some(delta) = delta_rx.recv() => Step::Delta(delta),
                    outcome = retry.as_mut() => Step::Finished(outcome),
                };

                match step {
                    Step::Delta(delta) => yield ChatEvent::content(delta),
                    Step::Finished(outcome) => break outcome,
                }
            };

            while let Ok(delta) = delta_rx.try_recv() {
                yield ChatEvent::content(delta);
            }

            let reply = match outcome {
                RetryOutcome::Success(reply) => reply,
                RetryOutcome::TransientFailure(error) | RetryOutcome::FatalFailure(error) => {
                    let degraded = degraded_reply(&error);
                    let word_delay = service.policy.degraded_word_delay;
                    for (index, word) in split_words(&degraded).into_iter().enumerate() {
                        if index > 0 && !word_delay.is_zero() {
                            Delay::new(word_delay).await;
                        }
                        yield ChatEvent::content(word);
                    }
                    degraded
                }
            };

            service.log.append(TurnDraft::assistant(reply));
            yield ChatEvent::done(DONE_MESSAGE);
        }))
    }

    /// The last `limit` turns, oldest first. Non-positive limits return none.
    pub fn history(&self, limit: i64) -> HistoryPage {
        let messages = usize::try_from(limit)
            .map(|limit| self.log.recent(limit))
            .unwrap_or_default();

        HistoryPage {
            messages,
            total: self.log.len(),
            status: STATUS_SUCCESS,
        }
    }

    fn prepare(&self, request: &ChatRequest) -> Result<UpstreamPayload, ChatError> {
        request.validate()?;

        let model = self.policy.model.clone();
        let payload = match &request.attachment {
            Some(attachment) => UpstreamPayload::with_image(model, request.text.clone(), attachment)?,
            None => UpstreamPayload::text(model, request.text.clone()),
        };

        Ok(payload)
    }

    fn log_user_turn(&self, request: ChatRequest) -> ChatTurn {
        let has_attachment = request.attachment.is_some();
        self.log.append(TurnDraft::user(
            request.text,
            request.client_timestamp,
            has_attachment,
        ))
    }
}

enum Step {
    Delta(String),
    Finished(RetryOutcome),
}

pub struct ChatServiceBuilder {
    transport: Arc<dyn UpstreamTransport>,
    log: Option<Arc<dyn ConversationLog>>,
    hooks: Arc<dyn UpstreamOperationHooks>,
    clock: Arc<dyn Clock>,
    policy: ChatPolicy,
}

impl ChatServiceBuilder {
    pub fn new(transport: Arc<dyn UpstreamTransport>) -> Self {
        Self {
            transport,
            log: None,
            hooks: Arc::new(NoopOperationHooks),
            clock: Arc::new(SystemClock),
            policy: ChatPolicy::default(),
        }
    }

    pub fn log(mut self, log: Arc<dyn ConversationLog>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn UpstreamOperationHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Clock for the default log. Ignored when a log is supplied.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn policy(mut self, policy: ChatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.policy.model = model.into();
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.policy.retry = retry;
        self
    }

    pub fn degraded_word_delay(mut self, delay: Duration) -> Self {
        self.policy.degraded_word_delay = delay;
        self
    }

    pub fn build(self) -> ChatService {
        let clock = self.clock;
        let log = self
            .log
            .unwrap_or_else(|| Arc::new(InMemoryConversationLog::with_clock(clock)));

        ChatService {
            transport: self.transport,
            log,
            hooks: self.hooks,
            policy: self.policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_uses_fixed_model_and_schedule() {
        let policy = ChatPolicy::default();
        assert_eq!(policy.model, "gemini-2.5-pro-thinking");
        assert_eq!(policy.retry.max_attempts(), 3);
        assert_eq!(policy.degraded_word_delay, Duration::from_millis(40));
    }
}

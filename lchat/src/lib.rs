//! Chat orchestration over a single upstream chat-completion service.
//!
//! [`ChatService`] turns a caller's message into upstream attempts, logs both
//! sides of the exchange in a [`ConversationLog`], and answers either with one
//! [`ChatReply`] or with a stream of [`ChatEvent`] records.

mod degrade;
mod error;
mod log;
mod service;
mod types;

pub mod prelude {
    pub use crate::{
        ChatError, ChatErrorKind, ChatEvent, ChatEventStream, ChatPolicy, ChatReply, ChatRequest,
        ChatService, ChatServiceBuilder, ChatTurn, ConversationLog, HistoryPage,
        InMemoryConversationLog, TurnDraft, TurnRole,
    };
}

pub use degrade::degraded_reply;
pub use error::{ChatError, ChatErrorKind};
pub use log::{ChatTurn, ConversationLog, InMemoryConversationLog, TurnDraft, TurnRole};
pub use service::{
    ChatPolicy, ChatService, ChatServiceBuilder, DEFAULT_DEGRADED_WORD_DELAY,
    DEFAULT_HISTORY_LIMIT, DEFAULT_MODEL, DONE_MESSAGE, PROCESSING_MESSAGE, USER_SAVED_MESSAGE,
};
pub use types::{ChatEvent, ChatEventStream, ChatReply, ChatRequest, HistoryPage, STATUS_SUCCESS};

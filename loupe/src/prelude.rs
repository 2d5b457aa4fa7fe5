//! Common imports for most loupe applications.

pub use crate::{
    ChatError, ChatErrorKind, ChatEvent, ChatEventStream, ChatReply, ChatRequest, ChatService,
    ChatTurn, ConfigError, ConversationLog, Gateway, GatewayConfig, GatewayError, HistoryPage,
    ImageAttachment, InMemoryConversationLog, RetryPolicy, TurnRole,
};
pub use crate::{
    build_gateway, build_gateway_with, build_gateway_with_hooks, chat_request, init_tracing,
    parse_history_limit, screenshot_request,
};

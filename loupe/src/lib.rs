//! Unified facade over the loupe workspace crates.
//!
//! This crate is the single dependency for most applications: it loads the
//! process configuration, wires the upstream client, conversation log and
//! observability hooks into a [`ChatService`], and re-exports the types a
//! request boundary needs.
//!
//! ```rust,no_run
//! use loupe::prelude::*;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! init_tracing("loupe=info,warn");
//! let gateway = build_gateway(GatewayConfig::from_env()?)?;
//! let reply = gateway.chat.send_chat(chat_request("hello")).await?;
//! println!("{}", reply.reply);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod prelude;
pub mod runtime;
pub mod telemetry;
pub mod util;

pub use lchat;
pub use lcommon;
pub use lobserve;
pub use lprovider;

pub use lchat::{
    ChatError, ChatErrorKind, ChatEvent, ChatEventStream, ChatPolicy, ChatReply, ChatRequest,
    ChatService, ChatServiceBuilder, ChatTurn, ConversationLog, DEFAULT_HISTORY_LIMIT,
    HistoryPage, InMemoryConversationLog, TurnDraft, TurnRole,
};
pub use lcommon::{BoxFuture, Clock, FixedClock, SystemClock};
pub use lobserve::{MetricsObservabilityHooks, SafeUpstreamHooks, TracingObservabilityHooks};
pub use lprovider::{
    HttpUpstreamClient, ImageAttachment, NoopOperationHooks, RetryPolicy, SecretString,
    UpstreamError, UpstreamErrorKind, UpstreamOperationHooks, UpstreamTransport,
};

pub use config::{ConfigError, ConfigErrorKind, DEFAULT_BASE_URL, GatewayConfig};
pub use runtime::{
    Gateway, GatewayError, HealthStatus, build_gateway, build_gateway_with,
    build_gateway_with_hooks, default_hooks,
};
pub use telemetry::init_tracing;
pub use util::{chat_request, parse_history_limit, screenshot_request};

//! Runtime wiring for a process-wide gateway.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use lchat::{ChatService, ConversationLog, InMemoryConversationLog};
use lobserve::{SafeUpstreamHooks, TracingObservabilityHooks};
use lprovider::{HttpUpstreamClient, UpstreamError, UpstreamOperationHooks, UpstreamTransport};
use serde::Serialize;

use crate::{ConfigError, GatewayConfig};

pub const HEALTH_STATUS_OK: &str = "ok";

/// The log is constructed once here and shared by every clone of `chat`.
#[derive(Clone)]
pub struct Gateway {
    pub chat: ChatService,
    pub log: Arc<dyn ConversationLog>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub message: String,
}

impl Gateway {
    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: HEALTH_STATUS_OK,
            message: format!("loupe gateway is running, {} turns logged", self.log.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    Config(ConfigError),
    Upstream(UpstreamError),
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(error) => write!(f, "invalid gateway config: {error}"),
            Self::Upstream(error) => write!(f, "failed to build upstream client: {error}"),
        }
    }
}

impl Error for GatewayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(error) => Some(error),
            Self::Upstream(error) => Some(error),
        }
    }
}

impl From<ConfigError> for GatewayError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<UpstreamError> for GatewayError {
    fn from(value: UpstreamError) -> Self {
        Self::Upstream(value)
    }
}

pub fn default_hooks() -> Arc<dyn UpstreamOperationHooks> {
    Arc::new(SafeUpstreamHooks::new(TracingObservabilityHooks))
}

pub fn build_gateway(config: GatewayConfig) -> Result<Gateway, GatewayError> {
    build_gateway_with_hooks(config, default_hooks())
}

pub fn build_gateway_with_hooks(
    config: GatewayConfig,
    hooks: Arc<dyn UpstreamOperationHooks>,
) -> Result<Gateway, GatewayError> {
    config.validate()?;

    let transport = Arc::new(HttpUpstreamClient::new(config.client_config())?);
    tracing::info!(
        endpoint = transport.endpoint(),
        model = %config.model,
        max_attempts = config.retry.max_attempts(),
        "loupe gateway configured"
    );

    let log: Arc<dyn ConversationLog> = Arc::new(InMemoryConversationLog::new());
    Ok(build_gateway_with(&config, transport, log, hooks))
}

pub fn build_gateway_with(
    config: &GatewayConfig,
    transport: Arc<dyn UpstreamTransport>,
    log: Arc<dyn ConversationLog>,
    hooks: Arc<dyn UpstreamOperationHooks>,
) -> Gateway {
    let chat = ChatService::builder(transport)
        .log(Arc::clone(&log))
        .hooks(hooks)
        .policy(config.chat_policy())
        .build();

    Gateway { chat, log }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_gateway_rejects_invalid_config() {
        let error = match build_gateway(GatewayConfig::new("  ")) {
            Ok(_) => panic!("blank key must fail"),
            Err(error) => error,
        };
        assert!(matches!(error, GatewayError::Config(_)));
    }

    #[test]
    fn built_gateway_shares_one_log_and_reports_health() {
        let gateway = build_gateway(GatewayConfig::new("sk-test").with_model("m"))
            .expect("gateway should build");

        assert!(Arc::ptr_eq(&gateway.log, gateway.chat.log()));
        assert_eq!(gateway.chat.policy().model, "m");

        let health = gateway.health();
        assert_eq!(health.status, "ok");
        assert!(health.message.contains("0 turns"));
    }
}

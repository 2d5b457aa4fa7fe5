//! Process-wide gateway configuration.
//!
//! Everything here is fixed when the process starts; nothing is tunable per
//! request.
//!
//! ```rust
//! use loupe::GatewayConfig;
//!
//! let config = GatewayConfig::from_lookup(|key| match key {
//!     "LOUPE_API_KEY" => Some("sk-test".to_string()),
//!     _ => None,
//! })
//! .expect("api key is the only required value");
//!
//! assert_eq!(config.endpoint(), "https://qfgapi.com/v1/chat/completions");
//! assert_eq!(config.retry.max_attempts(), 3);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use lchat::{ChatPolicy, DEFAULT_DEGRADED_WORD_DELAY, DEFAULT_MODEL};
use lprovider::{
    DEFAULT_BLOCKING_TIMEOUT, DEFAULT_STREAMING_TIMEOUT, RetryPolicy, SecretString,
    UpstreamClientConfig,
};

pub const DEFAULT_BASE_URL: &str = "https://qfgapi.com/v1";

pub const ENV_UPSTREAM_URL: &str = "LOUPE_UPSTREAM_URL";
pub const ENV_API_KEY: &str = "LOUPE_API_KEY";
pub const ENV_MODEL: &str = "LOUPE_MODEL";
pub const ENV_MAX_RETRIES: &str = "LOUPE_MAX_RETRIES";
pub const ENV_RETRY_DELAY_MS: &str = "LOUPE_RETRY_DELAY_MS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    Missing,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub kind: ConfigErrorKind,
    pub key: &'static str,
    pub message: String,
}

impl ConfigError {
    pub fn missing(key: &'static str) -> Self {
        Self {
            kind: ConfigErrorKind::Missing,
            key,
            message: format!("{key} must be set"),
        }
    }

    pub fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: ConfigErrorKind::Invalid,
            key,
            message: message.into(),
        }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} config `{}`: {}", self.kind, self.key, self.message)
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub api_key: SecretString,
    pub model: String,
    pub blocking_timeout: Duration,
    pub streaming_timeout: Duration,
    pub retry: RetryPolicy,
    pub degraded_word_delay: Duration,
}

impl GatewayConfig {
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            blocking_timeout: DEFAULT_BLOCKING_TIMEOUT,
            streaming_timeout: DEFAULT_STREAMING_TIMEOUT,
            retry: RetryPolicy::default(),
            degraded_word_delay: DEFAULT_DEGRADED_WORD_DELAY,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from a key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = value(ENV_API_KEY).ok_or_else(|| ConfigError::missing(ENV_API_KEY))?;
        let mut config = Self::new(api_key);

        if let Some(base_url) = value(ENV_UPSTREAM_URL) {
            config.base_url = base_url;
        }

        if let Some(model) = value(ENV_MODEL) {
            config.model = model;
        }

        if let Some(raw) = value(ENV_MAX_RETRIES) {
            config.retry.max_retries = parse_number::<u32>(ENV_MAX_RETRIES, &raw)?;
        }

        if let Some(raw) = value(ENV_RETRY_DELAY_MS) {
            let millis = parse_number::<u64>(ENV_RETRY_DELAY_MS, &raw)?;
            config.retry.delay = Duration::from_millis(millis);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_blocking_timeout(mut self, timeout: Duration) -> Self {
        self.blocking_timeout = timeout;
        self
    }

    pub fn with_streaming_timeout(mut self, timeout: Duration) -> Self {
        self.streaming_timeout = timeout;
        self
    }

    pub fn with_degraded_word_delay(mut self, delay: Duration) -> Self {
        self.degraded_word_delay = delay;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.is_empty() {
            return Err(ConfigError::missing(ENV_API_KEY));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::invalid(ENV_MODEL, "model must not be empty"));
        }

        let base_url = self.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::invalid(
                ENV_UPSTREAM_URL,
                format!("`{base_url}` is not an http(s) URL"),
            ));
        }

        if self.blocking_timeout.is_zero() || self.streaming_timeout.is_zero() {
            return Err(ConfigError::invalid(
                "timeout",
                "upstream timeouts must be greater than zero",
            ));
        }

        Ok(())
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim().trim_end_matches('/'))
    }

    pub fn client_config(&self) -> UpstreamClientConfig {
        UpstreamClientConfig::new(self.base_url.trim(), self.api_key.clone())
            .with_blocking_timeout(self.blocking_timeout)
            .with_streaming_timeout(self.streaming_timeout)
    }

    pub fn chat_policy(&self) -> ChatPolicy {
        ChatPolicy {
            model: self.model.clone(),
            retry: self.retry.clone(),
            degraded_word_delay: self.degraded_word_delay,
        }
    }
}

fn parse_number<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse::<T>()
        .map_err(|err| ConfigError::invalid(key, format!("`{raw}` is not a valid number: {err}")))
}

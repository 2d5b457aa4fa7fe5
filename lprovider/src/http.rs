//! reqwest-based implementation of [`UpstreamTransport`].

use std::time::Duration;

use async_stream::try_stream;
use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderValue};

use crate::transport::{LineBuffer, LineStream, StreamingResponse, UpstreamResponse};
use crate::{SecretString, UpstreamError, UpstreamFuture, UpstreamPayload, UpstreamTransport};

pub const DEFAULT_BLOCKING_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_STREAMING_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct UpstreamClientConfig {
    pub base_url: String,
    pub api_key: SecretString,
    pub blocking_timeout: Duration,
    /// Bounds connecting, waiting for headers, and every gap between body chunks.
    pub streaming_timeout: Duration,
}

impl UpstreamClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<SecretString>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            blocking_timeout: DEFAULT_BLOCKING_TIMEOUT,
            streaming_timeout: DEFAULT_STREAMING_TIMEOUT,
        }
    }

    pub fn with_blocking_timeout(mut self, timeout: Duration) -> Self {
        self.blocking_timeout = timeout;
        self
    }

    pub fn with_streaming_timeout(mut self, timeout: Duration) -> Self {
        self.streaming_timeout = timeout;
        self
    }
}

#[derive(Debug, Clone)]
pub struct HttpUpstreamClient {
    client: Client,
    endpoint: String,
    api_key: SecretString,
    blocking_timeout: Duration,
    streaming_timeout: Duration,
}

impl HttpUpstreamClient {
    pub fn new(config: UpstreamClientConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .connect_timeout(config.streaming_timeout)
            .build()
            .map_err(|err| UpstreamError::transport(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key,
            blocking_timeout: config.blocking_timeout,
            streaming_timeout: config.streaming_timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request(&self, payload: &UpstreamPayload) -> reqwest::RequestBuilder {
        self.client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose())
            .json(payload)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::timeout(err.to_string())
    } else if err.is_connect() {
        UpstreamError::connect(err.to_string())
    } else {
        UpstreamError::transport(err.to_string())
    }
}

impl UpstreamTransport for HttpUpstreamClient {
    fn call_blocking<'a>(
        &'a self,
        payload: UpstreamPayload,
    ) -> UpstreamFuture<'a, Result<UpstreamResponse, UpstreamError>> {
        Box::pin(async move {
            let payload = payload.blocking();
            let response = self
                .request(&payload)
                .timeout(self.blocking_timeout)
                .send()
                .await
                .map_err(map_reqwest_error)?;

            let status = response.status().as_u16();
            let body = response.text().await.map_err(map_reqwest_error)?;

            Ok(UpstreamResponse { status, body })
        })
    }

    fn call_streaming<'a>(
        &'a self,
        payload: UpstreamPayload,
    ) -> UpstreamFuture<'a, Result<StreamingResponse<'a>, UpstreamError>> {
        Box::pin(async move {
            let payload = payload.streaming();
            let idle = self.streaming_timeout;
            let send = self
                .request(&payload)
                .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
                .send();

            let response = tokio::time::timeout(idle, send)
                .await
                .map_err(|_| {
                    UpstreamError::timeout(format!("no upstream response within {idle:?}"))
                })?
                .map_err(map_reqwest_error)?;

            let status = response.status().as_u16();
            let lines = try_stream! {
                let mut chunks = response.bytes_stream();
                let mut buffer = LineBuffer::new();

                loop {
                    let next = tokio::time::timeout(idle, chunks.next())
                        .await
                        .map_err(|_| {
                            UpstreamError::timeout(format!("upstream stream idle for {idle:?}"))
                        })?;

                    let Some(chunk) = next else {
                        break;
                    };

                    let chunk = chunk.map_err(map_reqwest_error)?;
                    for line in buffer.push(&chunk) {
                        yield line;
                    }
                }

                if let Some(line) = buffer.finish() {
                    yield line;
                }
            };

            Ok(StreamingResponse {
                status,
                lines: Box::pin(lines) as LineStream<'a>,
            })
        })
    }
}

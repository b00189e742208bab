//! HTTPS JSON-RPC provider backed by `reqwest`.
//!
//! One POST per request, no retries: a non-2xx answer is reported as
//! [`TransportError::HttpStatus`] so callers (the facade in particular) can
//! look at the status code.

use std::time::Duration;

use async_trait::async_trait;

use chainrelay_core::error::TransportError;
use chainrelay_core::request::{JsonRpcRequest, JsonRpcResponse};
use chainrelay_core::transport::{ConnectionStatus, RequestOptions, TransportProvider};

/// Configuration for `HttpProvider`.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Timeout applied when the request carries none of its own.
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("chainrelay/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Connectionless HTTPS transport.
#[derive(Debug)]
pub struct HttpProvider {
    url: String,
    http: reqwest::Client,
    request_timeout: Duration,
}

impl HttpProvider {
    /// Create a provider for the given JSON-RPC endpoint URL.
    pub fn new(url: impl Into<String>, config: HttpConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| TransportError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            url: url.into(),
            http,
            request_timeout: config.request_timeout,
        })
    }

    /// Create with default configuration.
    pub fn default_for(url: impl Into<String>) -> Result<Self, TransportError> {
        Self::new(url, HttpConfig::default())
    }
}

fn map_send_error(e: reqwest::Error, timeout: Duration) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout {
            ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    } else {
        TransportError::Http(e.to_string())
    }
}

#[async_trait]
impl TransportProvider for HttpProvider {
    async fn request(
        &self,
        payload: JsonRpcRequest,
        options: Option<RequestOptions>,
    ) -> Result<JsonRpcResponse, TransportError> {
        let options = options.unwrap_or_default();
        let timeout = options.timeout.unwrap_or(self.request_timeout);

        let mut builder = self.http.post(&self.url).json(&payload).timeout(timeout);
        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        tracing::trace!(method = %payload.method, id = %payload.id, "sending HTTP request");
        let resp = builder
            .send()
            .await
            .map_err(|e| map_send_error(e, timeout))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = match resp.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!(status, error = %e, "failed to read rejected response body");
                    String::new()
                }
            };
            tracing::debug!(status, method = %payload.method, "HTTP request rejected");
            return Err(TransportError::HttpStatus { status, body });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| TransportError::Http(format!("failed to read response body: {e}")))?;
        Ok(serde_json::from_slice::<JsonRpcResponse>(&body)?)
    }

    /// HTTP has no connection to track; the provider is always ready.
    fn status(&self) -> ConnectionStatus {
        ConnectionStatus::Connected
    }

    fn supports_subscriptions(&self) -> bool {
        false
    }

    fn url(&self) -> &str {
        &self.url
    }
}

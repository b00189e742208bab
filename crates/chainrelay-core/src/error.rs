//! Transport-level error types.

use thiserror::Error;

use crate::request::JsonRpcError;

/// HTTP status the facade re-classifies as [`TransportError::RateLimited`].
pub const RATE_LIMIT_STATUS: i64 = 429;

/// Errors that can occur while building or using an RPC provider.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed before a status was received (connection refused, timeout, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The endpoint answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// WebSocket connection/send/receive error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// JSON-RPC protocol-level error returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// The endpoint rejected the request for exceeding its quota.
    ///
    /// Carries nothing from the underlying error, only the name of the
    /// provider that was throttled.
    #[error("Rate limit exceeded (provider: {provider})")]
    RateLimited { provider: String },

    /// Request timed out after the configured duration.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Response could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("unsupported transport: {0}")]
    UnsupportedTransport(String),

    #[error("unsupported network: {0}")]
    UnsupportedNetwork(String),

    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// An unexpected error.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Numeric code carried by the error, if any.
    ///
    /// HTTP status for [`Self::HttpStatus`], the JSON-RPC error code for
    /// [`Self::Rpc`], `None` for everything else.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::HttpStatus { status, .. } => Some(i64::from(*status)),
            Self::Rpc(err) => Some(err.code),
            _ => None,
        }
    }

    /// Returns `true` if the underlying endpoint reported HTTP 429.
    pub fn is_rate_limit_status(&self) -> bool {
        self.code() == Some(RATE_LIMIT_STATUS)
    }

    /// Returns `true` if this error is the facade's rate-limit classification.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Returns `true` if this is a node-side execution error.
    pub fn is_execution_error(&self) -> bool {
        matches!(self, Self::Rpc(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_exposes_code() {
        let err = TransportError::HttpStatus {
            status: 429,
            body: "too many requests".into(),
        };
        assert_eq!(err.code(), Some(429));
        assert!(err.is_rate_limit_status());
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn rpc_error_exposes_json_rpc_code() {
        let err = TransportError::Rpc(JsonRpcError {
            code: -32000,
            message: "execution reverted".into(),
            data: None,
        });
        assert_eq!(err.code(), Some(-32000));
        assert!(err.is_execution_error());
    }

    #[test]
    fn plain_errors_have_no_code() {
        assert_eq!(TransportError::Http("refused".into()).code(), None);
        assert_eq!(TransportError::WebSocket("closed".into()).code(), None);
    }

    #[test]
    fn rate_limited_display() {
        let err = TransportError::RateLimited {
            provider: "quicknode".into(),
        };
        assert_eq!(err.to_string(), "Rate limit exceeded (provider: quicknode)");
    }
}

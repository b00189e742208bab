//! The `TransportProvider` trait: the contract every concrete transport
//! (HTTPS, WebSocket, test doubles) implements for the facade.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::events::EventEmitter;
use crate::request::{JsonRpcRequest, JsonRpcResponse};

/// Wire channel used to reach an RPC endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Https,
    #[serde(alias = "ws", alias = "wss")]
    WebSocket,
}

impl Transport {
    /// URL scheme for this transport (`https` / `wss`).
    pub fn scheme(self) -> &'static str {
        match self {
            Self::Https => "https",
            Self::WebSocket => "wss",
        }
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Https => write!(f, "https"),
            Self::WebSocket => write!(f, "websocket"),
        }
    }
}

impl FromStr for Transport {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "https" | "http" => Ok(Self::Https),
            "websocket" | "ws" | "wss" => Ok(Self::WebSocket),
            _ => Err(TransportError::UnsupportedTransport(s.to_string())),
        }
    }
}

/// Connection state reported by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Disconnected => write!(f, "disconnected"),
        }
    }
}

/// Per-request knobs, honoured by the HTTPS transport.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub timeout: Option<Duration>,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Connection management, implemented only by stateful transports.
#[async_trait]
pub trait Lifecycle: Send + Sync {
    /// Open the connection if it is not open already.
    async fn connect(&self) -> Result<(), TransportError>;

    /// Close the connection. `code` defaults to 1000 (normal closure).
    async fn disconnect(&self, code: Option<u16>, reason: Option<String>)
        -> Result<(), TransportError>;

    /// Drop in-flight requests and re-establish the connection.
    async fn reset(&self) -> Result<(), TransportError>;
}

/// The async contract every RPC transport must implement.
///
/// Event emission and connection management are optional capabilities:
/// a transport advertises them by returning `Some` from [`events`] /
/// [`lifecycle`].
///
/// [`events`]: TransportProvider::events
/// [`lifecycle`]: TransportProvider::lifecycle
#[async_trait]
pub trait TransportProvider: Send + Sync + 'static {
    /// Send a single JSON-RPC request and return the response.
    async fn request(
        &self,
        payload: JsonRpcRequest,
        options: Option<RequestOptions>,
    ) -> Result<JsonRpcResponse, TransportError>;

    /// Current connection state.
    fn status(&self) -> ConnectionStatus;

    /// Whether `eth_subscribe` style push notifications are available.
    fn supports_subscriptions(&self) -> bool;

    /// Endpoint this transport talks to.
    fn url(&self) -> &str;

    fn events(&self) -> Option<&EventEmitter> {
        None
    }

    fn lifecycle(&self) -> Option<&dyn Lifecycle> {
        None
    }
}

/// Builds the concrete transport for a URL chosen by the facade.
pub trait TransportFactory {
    type Http: TransportProvider;
    type Ws: TransportProvider;

    fn https(&self, url: &str) -> Result<Self::Http, TransportError>;

    fn websocket(&self, url: &str) -> Result<Self::Ws, TransportError>;
}

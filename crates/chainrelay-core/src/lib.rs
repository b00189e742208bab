//! chainrelay-core — provider facade and transport contracts for ChainRelay.
//!
//! # Overview
//!
//! A [`ProviderFacade`] owns exactly one transport provider, picked at
//! construction from a [`Transport`] and built from a URL that an injected
//! [`RpcUrlBuilder`] computes. Every call is forwarded to that provider; the
//! one exception is an HTTPS 429, which surfaces as
//! [`TransportError::RateLimited`].
//!
//! - [`TransportProvider`] — the async capability trait transports implement
//! - [`EventEmitter`] / [`ProviderEvent`] — lifecycle event forwarding
//! - [`JsonRpcRequest`] / [`JsonRpcResponse`] — wire types
//! - [`Network`] — target chain identifiers

pub mod error;
pub mod events;
pub mod facade;
pub mod network;
pub mod request;
pub mod transport;
pub mod url;

pub use error::TransportError;
pub use events::{EventEmitter, ListenerId, ProviderEvent};
pub use facade::{Backend, ProviderFacade};
pub use network::Network;
pub use request::{IdGenerator, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId};
pub use transport::{
    ConnectionStatus, Lifecycle, RequestOptions, Transport, TransportFactory, TransportProvider,
};
pub use url::RpcUrlBuilder;

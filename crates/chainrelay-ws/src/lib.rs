//! chainrelay-ws — WebSocket JSON-RPC transport provider.
//!
//! # Features
//! - Lazy connect on first request, or explicit `connect()`
//! - `connect` / `disconnect` / `message` events through an [`EventEmitter`]
//! - Auto-reconnect on disconnect (exponential backoff, bounded attempts)
//! - Request multiplexing over a single connection
//!
//! [`EventEmitter`]: chainrelay_core::EventEmitter

pub mod client;

pub use client::{WsConfig, WsProvider, CLOSE_ABNORMAL, CLOSE_NORMAL};

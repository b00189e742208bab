//! chainrelay-http — HTTPS JSON-RPC transport provider.
//!
//! Plain request/response over `reqwest`; honours per-request
//! [`RequestOptions`](chainrelay_core::RequestOptions) timeouts and headers.

pub mod client;

pub use client::{HttpConfig, HttpProvider};

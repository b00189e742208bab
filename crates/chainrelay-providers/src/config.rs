//! Serializable provider configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use chainrelay_core::{Network, ProviderFacade, Transport, TransportError};
use chainrelay_http::HttpConfig;
use chainrelay_ws::WsConfig;

use crate::factory::{DefaultTransports, RelayProvider};
use crate::ProviderKind;

/// Everything needed to build a [`RelayProvider`], loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub provider: ProviderKind,
    #[serde(default = "default_network")]
    pub network: Network,
    #[serde(default = "default_transport")]
    pub transport: Transport,
    /// API key / endpoint token
    #[serde(default)]
    pub token: String,
    /// Host override (required for personal QuickNode endpoints)
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "bool_true")]
    pub auto_reconnect: bool,
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    /// Initial reconnect backoff in milliseconds
    #[serde(default = "default_reconnect_backoff_ms")]
    pub reconnect_backoff_ms: u64,
}

fn default_network() -> Network { Network::EthMainnet }
fn default_transport() -> Transport { Transport::Https }
fn default_request_timeout_ms() -> u64 { 30_000 }
fn bool_true() -> bool { true }
fn default_max_reconnect_attempts() -> u32 { 5 }
fn default_reconnect_backoff_ms() -> u64 { 500 }

impl ProviderConfig {
    /// Config for `provider` with every other field at its default.
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            network: default_network(),
            transport: default_transport(),
            token: String::new(),
            host: String::new(),
            request_timeout_ms: default_request_timeout_ms(),
            auto_reconnect: true,
            max_reconnect_attempts: default_max_reconnect_attempts(),
            reconnect_backoff_ms: default_reconnect_backoff_ms(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, TransportError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TransportError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| TransportError::Other(format!("reading {}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// Transport settings derived from this config.
    pub fn transports(&self) -> DefaultTransports {
        DefaultTransports {
            http: HttpConfig {
                request_timeout: Duration::from_millis(self.request_timeout_ms),
                ..HttpConfig::default()
            },
            ws: WsConfig {
                auto_reconnect: self.auto_reconnect,
                max_reconnect_attempts: self.max_reconnect_attempts,
                reconnect_initial: Duration::from_millis(self.reconnect_backoff_ms),
                ..WsConfig::default()
            },
        }
    }

    pub fn build(&self) -> Result<RelayProvider, TransportError> {
        ProviderFacade::new(
            &self.provider,
            &self.transports(),
            self.network,
            self.transport,
            &self.token,
            &self.host,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_json_uses_defaults() {
        let cfg = ProviderConfig::from_json_str(r#"{ "provider": "alchemy", "token": "k" }"#).unwrap();
        assert_eq!(cfg.provider, ProviderKind::Alchemy);
        assert_eq!(cfg.network, Network::EthMainnet);
        assert_eq!(cfg.transport, Transport::Https);
        assert_eq!(cfg.request_timeout_ms, 30_000);
        assert!(cfg.auto_reconnect);
        assert_eq!(cfg, ProviderConfig { token: "k".into(), ..ProviderConfig::new(ProviderKind::Alchemy) });
    }

    #[test]
    fn full_json() {
        let cfg = ProviderConfig::from_json_str(
            r#"{
                "provider": "quicknode",
                "network": "base_sepolia",
                "transport": "wss",
                "token": "abc",
                "host": "my-node.quiknode.pro",
                "auto_reconnect": false,
                "reconnect_backoff_ms": 50
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.transport, Transport::WebSocket);
        assert_eq!(cfg.network, Network::BaseSepolia);

        let transports = cfg.transports();
        assert!(!transports.ws.auto_reconnect);
        assert_eq!(transports.ws.reconnect_initial, Duration::from_millis(50));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = ProviderConfig::from_json_str(r#"{ "provider": "nobody" }"#).unwrap_err();
        assert!(matches!(err, TransportError::Deserialization(_)));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = ProviderConfig::from_file("/nonexistent/chainrelay.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/chainrelay.json"));
    }
}

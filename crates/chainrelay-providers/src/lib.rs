//! chainrelay-providers — ready-made URL builders for major RPC vendors.
//!
//! Each vendor module knows how its endpoint URLs are laid out per network
//! and transport. Pair one with [`DefaultTransports`] to get a
//! [`RelayProvider`].
//!
//! # Quick start
//! ```rust,no_run
//! use chainrelay_core::{Network, Transport};
//! use chainrelay_providers::ProviderKind;
//!
//! # async fn demo() -> Result<(), chainrelay_core::TransportError> {
//! let provider = chainrelay_providers::build(
//!     ProviderKind::Alchemy,
//!     Network::EthMainnet,
//!     Transport::Https,
//!     "YOUR_API_KEY",
//!     "",
//! )?;
//! let block: String = provider.call("eth_blockNumber", vec![]).await?;
//! # Ok(())
//! # }
//! ```

pub mod alchemy;
pub mod config;
pub mod factory;
pub mod infura;
pub mod publicnode;
pub mod quicknode;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use chainrelay_core::{Network, ProviderFacade, RpcUrlBuilder, Transport, TransportError};

pub use alchemy::Alchemy;
pub use config::ProviderConfig;
pub use factory::{DefaultTransports, RelayProvider};
pub use infura::Infura;
pub use publicnode::PublicNode;
pub use quicknode::QuickNode;

/// The vendors this crate knows how to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    QuickNode,
    Alchemy,
    Infura,
    PublicNode,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        Self::QuickNode,
        Self::Alchemy,
        Self::Infura,
        Self::PublicNode,
    ];

    fn builder(self) -> &'static dyn RpcUrlBuilder {
        match self {
            Self::QuickNode => &QuickNode,
            Self::Alchemy => &Alchemy,
            Self::Infura => &Infura,
            Self::PublicNode => &PublicNode,
        }
    }

    /// Whether URLs for this vendor embed the token.
    pub fn requires_token(self) -> bool {
        !matches!(self, Self::PublicNode)
    }
}

impl RpcUrlBuilder for ProviderKind {
    fn rpc_url(&self, network: Network, transport: Transport, token: &str, host: &str) -> String {
        self.builder().rpc_url(network, transport, token, host)
    }

    fn name(&self) -> &str {
        self.builder().name()
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.builder().name())
    }
}

impl FromStr for ProviderKind {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.builder().name() == needle)
            .ok_or_else(|| TransportError::UnsupportedProvider(s.to_string()))
    }
}

/// Build a [`RelayProvider`] for `kind` with default transport settings.
pub fn build(
    kind: ProviderKind,
    network: Network,
    transport: Transport,
    token: &str,
    host: &str,
) -> Result<RelayProvider, TransportError> {
    if kind.requires_token() && token.is_empty() {
        tracing::warn!(provider = %kind, "no token given; the endpoint will likely reject requests");
    }
    ProviderFacade::new(&kind, &DefaultTransports::default(), network, transport, token, host)
}

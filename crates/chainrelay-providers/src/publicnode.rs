//! PublicNode endpoints.
//!
//! Free, no-API-key endpoints suitable for development and testing.
//! Rate limits are lower and reliability may vary. The token is ignored.

use chainrelay_core::{Network, RpcUrlBuilder, Transport};

pub const DEFAULT_HOST: &str = "publicnode.com";

/// `{https|wss}://{network}.publicnode.com`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublicNode;

impl RpcUrlBuilder for PublicNode {
    fn rpc_url(&self, network: Network, transport: Transport, _token: &str, host: &str) -> String {
        let host = if host.is_empty() { DEFAULT_HOST } else { host };
        format!("{}://{}.{host}", transport.scheme(), network_slug(network))
    }

    fn name(&self) -> &str {
        "publicnode"
    }
}

fn network_slug(network: Network) -> &'static str {
    match network {
        Network::EthMainnet => "ethereum-rpc",
        Network::EthSepolia => "ethereum-sepolia-rpc",
        Network::EthHolesky => "ethereum-holesky-rpc",
        Network::PolygonMainnet => "polygon-bor-rpc",
        Network::PolygonAmoy => "polygon-amoy-bor-rpc",
        Network::ArbitrumMainnet => "arbitrum-one-rpc",
        Network::ArbitrumSepolia => "arbitrum-sepolia-rpc",
        Network::BaseMainnet => "base-rpc",
        Network::BaseSepolia => "base-sepolia-rpc",
        Network::OptimismMainnet => "optimism-rpc",
        Network::OptimismSepolia => "optimism-sepolia-rpc",
        Network::BnbMainnet => "bsc-rpc",
        Network::BnbTestnet => "bsc-testnet-rpc",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ethereum_mainnet() {
        assert_eq!(
            PublicNode.rpc_url(Network::EthMainnet, Transport::Https, "ignored", ""),
            "https://ethereum-rpc.publicnode.com"
        );
    }

    #[test]
    fn polygon_ws() {
        assert_eq!(
            PublicNode.rpc_url(Network::PolygonMainnet, Transport::WebSocket, "", ""),
            "wss://polygon-bor-rpc.publicnode.com"
        );
    }
}

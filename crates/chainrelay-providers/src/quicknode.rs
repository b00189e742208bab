//! QuickNode URL builder.
//!
//! QuickNode endpoints live on personal subdomains, so `host` is normally the
//! full endpoint host and `token` the path segment that authenticates it.

use chainrelay_core::{Network, RpcUrlBuilder, Transport};

/// `{https|wss}://{host}/{token}`.
///
/// With an empty `host` the shared `{network}.quiknode.pro` host is used.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuickNode;

impl RpcUrlBuilder for QuickNode {
    fn rpc_url(&self, network: Network, transport: Transport, token: &str, host: &str) -> String {
        let scheme = transport.scheme();
        if host.is_empty() {
            format!("{scheme}://{}.quiknode.pro/{token}", network_slug(network))
        } else {
            format!("{scheme}://{host}/{token}")
        }
    }

    fn name(&self) -> &str {
        "quicknode"
    }
}

fn network_slug(network: Network) -> &'static str {
    match network {
        Network::EthMainnet => "mainnet",
        Network::EthSepolia => "ethereum-sepolia",
        Network::EthHolesky => "ethereum-holesky",
        Network::PolygonMainnet => "matic",
        Network::PolygonAmoy => "matic-amoy",
        Network::ArbitrumMainnet => "arbitrum-mainnet",
        Network::ArbitrumSepolia => "arbitrum-sepolia",
        Network::BaseMainnet => "base-mainnet",
        Network::BaseSepolia => "base-sepolia",
        Network::OptimismMainnet => "optimism",
        Network::OptimismSepolia => "optimism-sepolia",
        Network::BnbMainnet => "bsc",
        Network::BnbTestnet => "bsc-testnet",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn personal_endpoint() {
        let url = QuickNode.rpc_url(
            Network::EthMainnet,
            Transport::Https,
            "abc123",
            "little-wild-pond.quiknode.pro",
        );
        assert_eq!(url, "https://little-wild-pond.quiknode.pro/abc123");
    }

    #[test]
    fn websocket_scheme() {
        let url = QuickNode.rpc_url(Network::EthSepolia, Transport::WebSocket, "abc", "node.host");
        assert_eq!(url, "wss://node.host/abc");
    }

    #[test]
    fn default_host_per_network() {
        let url = QuickNode.rpc_url(Network::PolygonMainnet, Transport::Https, "t", "");
        assert_eq!(url, "https://matic.quiknode.pro/t");
    }
}

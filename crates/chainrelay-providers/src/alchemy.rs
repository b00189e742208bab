//! Alchemy URL builder.
//!
//! Rate limits: 300 CU/s on free tier, 660 CU/s on Growth, unlimited on Enterprise.
//! <https://docs.alchemy.com/reference/throughput>

use chainrelay_core::{Network, RpcUrlBuilder, Transport};

pub const DEFAULT_HOST: &str = "g.alchemy.com";

/// `{https|wss}://{network}.g.alchemy.com/v2/{api_key}`.
///
/// A non-empty `host` replaces `g.alchemy.com`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Alchemy;

impl RpcUrlBuilder for Alchemy {
    fn rpc_url(&self, network: Network, transport: Transport, token: &str, host: &str) -> String {
        let host = if host.is_empty() { DEFAULT_HOST } else { host };
        format!(
            "{}://{}.{host}/v2/{token}",
            transport.scheme(),
            network_slug(network)
        )
    }

    fn name(&self) -> &str {
        "alchemy"
    }
}

fn network_slug(network: Network) -> &'static str {
    match network {
        Network::EthMainnet => "eth-mainnet",
        Network::EthSepolia => "eth-sepolia",
        Network::EthHolesky => "eth-holesky",
        Network::PolygonMainnet => "polygon-mainnet",
        Network::PolygonAmoy => "polygon-amoy",
        Network::ArbitrumMainnet => "arb-mainnet",
        Network::ArbitrumSepolia => "arb-sepolia",
        Network::BaseMainnet => "base-mainnet",
        Network::BaseSepolia => "base-sepolia",
        Network::OptimismMainnet => "opt-mainnet",
        Network::OptimismSepolia => "opt-sepolia",
        Network::BnbMainnet => "bnb-mainnet",
        Network::BnbTestnet => "bnb-testnet",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn https_url_mainnet() {
        let url = Alchemy.rpc_url(Network::EthMainnet, Transport::Https, "test_key", "");
        assert_eq!(url, "https://eth-mainnet.g.alchemy.com/v2/test_key");
    }

    #[test]
    fn ws_url_base() {
        let url = Alchemy.rpc_url(Network::BaseMainnet, Transport::WebSocket, "key", "");
        assert_eq!(url, "wss://base-mainnet.g.alchemy.com/v2/key");
    }

    #[test]
    fn custom_host() {
        let url = Alchemy.rpc_url(Network::ArbitrumMainnet, Transport::Https, "key", "alchemy.internal");
        assert_eq!(url, "https://arb-mainnet.alchemy.internal/v2/key");
    }
}

//! Infura URL builder.

use chainrelay_core::{Network, RpcUrlBuilder, Transport};

pub const DEFAULT_HOST: &str = "infura.io";

/// `https://{network}.infura.io/v3/{project_id}` and
/// `wss://{network}.infura.io/ws/v3/{project_id}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Infura;

impl RpcUrlBuilder for Infura {
    fn rpc_url(&self, network: Network, transport: Transport, token: &str, host: &str) -> String {
        let host = if host.is_empty() { DEFAULT_HOST } else { host };
        let network = network_slug(network);
        match transport {
            Transport::Https => format!("https://{network}.{host}/v3/{token}"),
            Transport::WebSocket => format!("wss://{network}.{host}/ws/v3/{token}"),
        }
    }

    fn name(&self) -> &str {
        "infura"
    }
}

fn network_slug(network: Network) -> &'static str {
    match network {
        Network::EthMainnet => "mainnet",
        Network::EthSepolia => "sepolia",
        Network::EthHolesky => "holesky",
        Network::PolygonMainnet => "polygon-mainnet",
        Network::PolygonAmoy => "polygon-amoy",
        Network::ArbitrumMainnet => "arbitrum-mainnet",
        Network::ArbitrumSepolia => "arbitrum-sepolia",
        Network::BaseMainnet => "base-mainnet",
        Network::BaseSepolia => "base-sepolia",
        Network::OptimismMainnet => "optimism-mainnet",
        Network::OptimismSepolia => "optimism-sepolia",
        Network::BnbMainnet => "bsc-mainnet",
        Network::BnbTestnet => "bsc-testnet",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infura_mainnet_url() {
        assert_eq!(
            Infura.rpc_url(Network::EthMainnet, Transport::Https, "proj123", ""),
            "https://mainnet.infura.io/v3/proj123"
        );
    }

    #[test]
    fn infura_ws_path() {
        assert_eq!(
            Infura.rpc_url(Network::PolygonAmoy, Transport::WebSocket, "proj123", ""),
            "wss://polygon-amoy.infura.io/ws/v3/proj123"
        );
    }
}

//! Target chain identifiers.
//!
//! The facade never looks inside a [`Network`]; it only hands it to the URL
//! builder, which maps it to a vendor-specific host or path segment.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// A blockchain network reachable through the vendor URL builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    EthMainnet,
    EthSepolia,
    EthHolesky,
    PolygonMainnet,
    PolygonAmoy,
    ArbitrumMainnet,
    ArbitrumSepolia,
    BaseMainnet,
    BaseSepolia,
    OptimismMainnet,
    OptimismSepolia,
    BnbMainnet,
    BnbTestnet,
}

impl Network {
    pub const ALL: [Network; 13] = [
        Self::EthMainnet,
        Self::EthSepolia,
        Self::EthHolesky,
        Self::PolygonMainnet,
        Self::PolygonAmoy,
        Self::ArbitrumMainnet,
        Self::ArbitrumSepolia,
        Self::BaseMainnet,
        Self::BaseSepolia,
        Self::OptimismMainnet,
        Self::OptimismSepolia,
        Self::BnbMainnet,
        Self::BnbTestnet,
    ];

    /// Canonical snake_case name, e.g. `"eth_mainnet"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EthMainnet => "eth_mainnet",
            Self::EthSepolia => "eth_sepolia",
            Self::EthHolesky => "eth_holesky",
            Self::PolygonMainnet => "polygon_mainnet",
            Self::PolygonAmoy => "polygon_amoy",
            Self::ArbitrumMainnet => "arbitrum_mainnet",
            Self::ArbitrumSepolia => "arbitrum_sepolia",
            Self::BaseMainnet => "base_mainnet",
            Self::BaseSepolia => "base_sepolia",
            Self::OptimismMainnet => "optimism_mainnet",
            Self::OptimismSepolia => "optimism_sepolia",
            Self::BnbMainnet => "bnb_mainnet",
            Self::BnbTestnet => "bnb_testnet",
        }
    }

    /// EVM chain id.
    pub fn chain_id(self) -> u64 {
        match self {
            Self::EthMainnet => 1,
            Self::EthSepolia => 11_155_111,
            Self::EthHolesky => 17_000,
            Self::PolygonMainnet => 137,
            Self::PolygonAmoy => 80_002,
            Self::ArbitrumMainnet => 42_161,
            Self::ArbitrumSepolia => 421_614,
            Self::BaseMainnet => 8_453,
            Self::BaseSepolia => 84_532,
            Self::OptimismMainnet => 10,
            Self::OptimismSepolia => 11_155_420,
            Self::BnbMainnet => 56,
            Self::BnbTestnet => 97,
        }
    }

    /// Look a network up by EVM chain id.
    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|n| n.chain_id() == chain_id)
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = TransportError;

    /// Accepts the snake_case name or a decimal chain id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace('-', "_");
        if let Ok(chain_id) = needle.parse::<u64>() {
            return Self::from_chain_id(chain_id)
                .ok_or_else(|| TransportError::UnsupportedNetwork(s.to_string()));
        }
        Self::ALL
            .into_iter()
            .find(|n| n.as_str() == needle)
            .ok_or_else(|| TransportError::UnsupportedNetwork(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_by_name_and_chain_id() {
        assert_eq!("eth_mainnet".parse::<Network>().unwrap(), Network::EthMainnet);
        assert_eq!("Base-Sepolia".parse::<Network>().unwrap(), Network::BaseSepolia);
        assert_eq!("42161".parse::<Network>().unwrap(), Network::ArbitrumMainnet);
    }

    #[test]
    fn unknown_network_rejected() {
        let err = "solana".parse::<Network>().unwrap_err();
        assert!(matches!(err, TransportError::UnsupportedNetwork(_)));
        assert!("999999".parse::<Network>().is_err());
    }

    #[test]
    fn names_round_trip_through_serde() {
        for network in Network::ALL {
            let json = serde_json::to_string(&network).unwrap();
            assert_eq!(json, format!("\"{}\"", network.as_str()));
        }
    }
}

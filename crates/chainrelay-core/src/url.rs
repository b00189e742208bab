//! URL construction: the one customization point of a provider variant.

use crate::network::Network;
use crate::transport::Transport;

/// Builds the endpoint URL for a network/transport pair.
///
/// Implementations must be pure: the same inputs always yield the same URL.
pub trait RpcUrlBuilder: Send + Sync {
    fn rpc_url(&self, network: Network, transport: Transport, token: &str, host: &str) -> String;

    /// Name reported in rate-limit errors and logs.
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> RpcUrlBuilder for F
where
    F: Fn(Network, Transport, &str, &str) -> String + Send + Sync,
{
    fn rpc_url(&self, network: Network, transport: Transport, token: &str, host: &str) -> String {
        self(network, transport, token, host)
    }
}

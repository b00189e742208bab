//! Builds the real HTTPS / WebSocket transports for a facade.

use chainrelay_core::{ProviderFacade, TransportError, TransportFactory};
use chainrelay_http::{HttpConfig, HttpProvider};
use chainrelay_ws::{WsConfig, WsProvider};

/// A facade over the workspace's own transports.
pub type RelayProvider = ProviderFacade<HttpProvider, WsProvider>;

/// [`TransportFactory`] producing [`HttpProvider`] and [`WsProvider`].
#[derive(Debug, Clone, Default)]
pub struct DefaultTransports {
    pub http: HttpConfig,
    pub ws: WsConfig,
}

impl TransportFactory for DefaultTransports {
    type Http = HttpProvider;
    type Ws = WsProvider;

    fn https(&self, url: &str) -> Result<HttpProvider, TransportError> {
        HttpProvider::new(url, self.http.clone())
    }

    fn websocket(&self, url: &str) -> Result<WsProvider, TransportError> {
        Ok(WsProvider::new(url, self.ws.clone()))
    }
}

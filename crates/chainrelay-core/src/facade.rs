//! `ProviderFacade`: one transport provider chosen at construction, every
//! call forwarded to it.
//!
//! ```text
//! ProviderFacade::new(builder, factory, network, transport, token, host)
//!        │
//!        ├─ url = builder.rpc_url(network, transport, token, host)
//!        │
//!        ├─ Transport::Https     → Backend::Https(factory.https(url))
//!        └─ Transport::WebSocket → Backend::WebSocket(factory.websocket(url))
//! ```
//!
//! The only decision taken after construction is rate-limit translation on
//! HTTPS: a failure reporting status 429 in [`ProviderFacade::request`], or a
//! node error with code 429 in [`ProviderFacade::call`], becomes
//! [`TransportError::RateLimited`]. Everything else passes through.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{TransportError, RATE_LIMIT_STATUS};
use crate::events::{ListenerId, ProviderEvent};
use crate::network::Network;
use crate::request::{IdGenerator, JsonRpcRequest, JsonRpcResponse};
use crate::transport::{
    ConnectionStatus, Lifecycle, RequestOptions, Transport, TransportFactory, TransportProvider,
};
use crate::url::RpcUrlBuilder;

/// The concrete provider owned by a facade, tagged by transport.
#[derive(Debug)]
pub enum Backend<H, W> {
    Https(H),
    WebSocket(W),
}

impl<H: TransportProvider, W: TransportProvider> Backend<H, W> {
    pub fn transport(&self) -> Transport {
        match self {
            Self::Https(_) => Transport::Https,
            Self::WebSocket(_) => Transport::WebSocket,
        }
    }

    /// The owned provider, erased to the capability trait.
    pub fn provider(&self) -> &dyn TransportProvider {
        match self {
            Self::Https(p) => p,
            Self::WebSocket(p) => p,
        }
    }
}

/// Uniform request/event surface over one HTTPS or WebSocket provider.
pub struct ProviderFacade<H, W> {
    name: String,
    network: Network,
    url: String,
    backend: Backend<H, W>,
    ids: IdGenerator,
}

impl<H: TransportProvider, W: TransportProvider> ProviderFacade<H, W> {
    /// Build the URL with `url_builder` and create exactly one provider for
    /// `transport` through `factory`.
    pub fn new<U, F>(
        url_builder: &U,
        factory: &F,
        network: Network,
        transport: Transport,
        token: &str,
        host: &str,
    ) -> Result<Self, TransportError>
    where
        U: RpcUrlBuilder + ?Sized,
        F: TransportFactory<Http = H, Ws = W> + ?Sized,
    {
        let url = url_builder.rpc_url(network, transport, token, host);
        let backend = match transport {
            Transport::Https => Backend::Https(factory.https(&url)?),
            Transport::WebSocket => Backend::WebSocket(factory.websocket(&url)?),
        };

        tracing::debug!(
            provider = url_builder.name(),
            network = %network,
            transport = %transport,
            "provider facade created"
        );

        Ok(Self {
            name: url_builder.name().to_string(),
            network,
            url,
            backend,
            ids: IdGenerator::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn transport(&self) -> Transport {
        self.backend.transport()
    }

    /// URL produced by the builder at construction.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn backend(&self) -> &Backend<H, W> {
        &self.backend
    }

    /// Execute one JSON-RPC request on the owned provider.
    ///
    /// HTTPS: `options` are forwarded and a 429 failure is reported as
    /// [`TransportError::RateLimited`]; other failures are returned as-is.
    /// WebSocket: only `payload` is forwarded.
    pub async fn request(
        &self,
        payload: JsonRpcRequest,
        options: Option<RequestOptions>,
    ) -> Result<JsonRpcResponse, TransportError> {
        match &self.backend {
            Backend::Https(provider) => match provider.request(payload, options).await {
                Err(e) if e.is_rate_limit_status() => Err(self.rate_limited()),
                other => other,
            },
            Backend::WebSocket(provider) => {
                if options.is_some() {
                    tracing::trace!("request options ignored on WebSocket transport");
                }
                provider.request(payload, None).await
            }
        }
    }

    /// Call `method` and deserialize its result.
    ///
    /// Over HTTPS a node error carrying code 429 is reported as
    /// [`TransportError::RateLimited`], same as an HTTP 429.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, TransportError> {
        let req = JsonRpcRequest::new(self.ids.next_id(), method, params);
        let resp = self.request(req, None).await?;
        let result = match resp.into_result() {
            Ok(result) => result,
            Err(err) if err.code == RATE_LIMIT_STATUS && self.transport() == Transport::Https => {
                return Err(self.rate_limited());
            }
            Err(err) => return Err(TransportError::Rpc(err)),
        };
        serde_json::from_value(result).map_err(TransportError::Deserialization)
    }

    fn rate_limited(&self) -> TransportError {
        tracing::warn!(provider = %self.name, network = %self.network, "rate limited by RPC endpoint");
        TransportError::RateLimited {
            provider: self.name.clone(),
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.provider().status()
    }

    pub fn supports_subscriptions(&self) -> bool {
        self.provider().supports_subscriptions()
    }

    /// Register a listener on the provider. `None` if it emits no events.
    pub fn on<L>(&self, event: &str, listener: L) -> Option<ListenerId>
    where
        L: Fn(&ProviderEvent) + Send + Sync + 'static,
    {
        self.provider().events().map(|e| e.on(event, listener))
    }

    pub fn once<L>(&self, event: &str, listener: L) -> Option<ListenerId>
    where
        L: Fn(&ProviderEvent) + Send + Sync + 'static,
    {
        self.provider().events().map(|e| e.once(event, listener))
    }

    pub fn remove_listener(&self, event: &str, id: ListenerId) -> bool {
        self.provider()
            .events()
            .is_some_and(|e| e.remove_listener(event, id))
    }

    pub fn remove_all_listeners(&self, event: Option<&str>) -> usize {
        self.provider()
            .events()
            .map_or(0, |e| e.remove_all_listeners(event))
    }

    /// Open the provider's connection; no-op for connectionless transports.
    pub async fn connect(&self) -> Result<(), TransportError> {
        match self.lifecycle() {
            Some(lc) => lc.connect().await,
            None => Ok(()),
        }
    }

    pub async fn disconnect(
        &self,
        code: Option<u16>,
        reason: Option<String>,
    ) -> Result<(), TransportError> {
        match self.lifecycle() {
            Some(lc) => lc.disconnect(code, reason).await,
            None => Ok(()),
        }
    }

    pub async fn reset(&self) -> Result<(), TransportError> {
        match self.lifecycle() {
            Some(lc) => lc.reset().await,
            None => Ok(()),
        }
    }

    fn provider(&self) -> &dyn TransportProvider {
        self.backend.provider()
    }

    fn lifecycle(&self) -> Option<&dyn Lifecycle> {
        let lc = self.provider().lifecycle();
        if lc.is_none() {
            tracing::debug!(transport = %self.transport(), "provider has no lifecycle; skipping");
        }
        lc
    }
}

impl<H, W> std::fmt::Debug for ProviderFacade<H, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderFacade")
            .field("name", &self.name)
            .field("network", &self.network)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

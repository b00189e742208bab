//! WebSocket JSON-RPC provider with auto-reconnect and event emission.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use chainrelay_core::error::TransportError;
use chainrelay_core::events::{EventEmitter, ProviderEvent};
use chainrelay_core::request::{JsonRpcRequest, JsonRpcResponse, RpcId};
use chainrelay_core::transport::{ConnectionStatus, Lifecycle, RequestOptions, TransportProvider};

/// Normal closure.
pub const CLOSE_NORMAL: u16 = 1000;
/// Peer vanished without a close frame.
pub const CLOSE_ABNORMAL: u16 = 1006;
const CLOSE_NO_STATUS: u16 = 1005;

const SUBSCRIPTION_METHOD: &str = "eth_subscription";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type Reply = oneshot::Sender<Result<JsonRpcResponse, TransportError>>;
type CloseRequest = Option<(u16, String)>;
/// In-flight requests keyed by wire id, with the id the caller chose.
type Pending = HashMap<u64, (RpcId, Reply)>;

/// Configuration for the WebSocket provider.
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// Reconnect after the socket drops.
    pub auto_reconnect: bool,
    /// Consecutive failed connections tolerated before giving up.
    pub max_reconnect_attempts: u32,
    /// Reconnect backoff starting duration.
    pub reconnect_initial: Duration,
    /// Maximum reconnect backoff.
    pub reconnect_max: Duration,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            auto_reconnect: true,
            max_reconnect_attempts: 5,
            reconnect_initial: Duration::from_millis(500),
            reconnect_max: Duration::from_secs(60),
        }
    }
}

/// A request on its way to the socket task.
struct Outgoing {
    req: JsonRpcRequest,
    tx: Reply,
}

/// State shared between the provider handle and its socket task.
struct Shared {
    url: String,
    events: EventEmitter,
    status: Mutex<ConnectionStatus>,
}

impl Shared {
    fn set_status(&self, status: ConnectionStatus) {
        *lock(&self.status) = status;
    }
}

/// Handle to a running socket task.
struct Connection {
    cmd_tx: mpsc::UnboundedSender<Outgoing>,
    shutdown: watch::Sender<CloseRequest>,
}

impl Connection {
    fn close(self, code: u16, reason: String) {
        // The task also treats a dropped sender as a normal close.
        let _ = self.shutdown.send(Some((code, reason)));
    }
}

/// WebSocket JSON-RPC provider.
///
/// A background task owns the socket; requests reach it over a channel. The
/// task puts its own id on every outgoing request and restores the caller's
/// id on the reply, so callers may reuse ids freely. The socket is opened by
/// [`Lifecycle::connect`] or lazily by the first request.
pub struct WsProvider {
    shared: Arc<Shared>,
    config: WsConfig,
    conn: Mutex<Option<Connection>>,
}

impl WsProvider {
    /// Create a provider for `url`. No connection is made yet.
    pub fn new(url: impl Into<String>, config: WsConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                url: url.into(),
                events: EventEmitter::new(),
                status: Mutex::new(ConnectionStatus::Disconnected),
            }),
            config,
            conn: Mutex::new(None),
        }
    }

    pub fn default_for(url: impl Into<String>) -> Self {
        Self::new(url, WsConfig::default())
    }

    /// Sender into the live socket task, spawning one if none is running.
    fn ensure_task(&self) -> mpsc::UnboundedSender<Outgoing> {
        let mut conn = lock(&self.conn);
        if let Some(live) = conn.as_ref().filter(|c| !c.cmd_tx.is_closed()) {
            return live.cmd_tx.clone();
        }

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = watch::channel(None);
        self.shared.set_status(ConnectionStatus::Connecting);
        tokio::spawn(ws_task(
            self.shared.clone(),
            cmd_rx,
            shutdown_rx,
            self.config.clone(),
        ));
        *conn = Some(Connection {
            cmd_tx: cmd_tx.clone(),
            shutdown,
        });
        cmd_tx
    }
}

#[async_trait]
impl TransportProvider for WsProvider {
    async fn request(
        &self,
        payload: JsonRpcRequest,
        _options: Option<RequestOptions>,
    ) -> Result<JsonRpcResponse, TransportError> {
        let (tx, rx) = oneshot::channel();
        self.ensure_task()
            .send(Outgoing { req: payload, tx })
            .map_err(|_| TransportError::WebSocket("WS task closed".into()))?;
        rx.await
            .map_err(|_| TransportError::WebSocket("WS response dropped".into()))?
    }

    fn status(&self) -> ConnectionStatus {
        *lock(&self.shared.status)
    }

    fn supports_subscriptions(&self) -> bool {
        true
    }

    fn url(&self) -> &str {
        &self.shared.url
    }

    fn events(&self) -> Option<&EventEmitter> {
        Some(&self.shared.events)
    }

    fn lifecycle(&self) -> Option<&dyn Lifecycle> {
        Some(self)
    }
}

#[async_trait]
impl Lifecycle for WsProvider {
    async fn connect(&self) -> Result<(), TransportError> {
        self.ensure_task();
        Ok(())
    }

    async fn disconnect(
        &self,
        code: Option<u16>,
        reason: Option<String>,
    ) -> Result<(), TransportError> {
        if let Some(conn) = lock(&self.conn).take() {
            conn.close(code.unwrap_or(CLOSE_NORMAL), reason.unwrap_or_default());
        }
        Ok(())
    }

    async fn reset(&self) -> Result<(), TransportError> {
        if let Some(conn) = lock(&self.conn).take() {
            conn.close(CLOSE_NORMAL, "reset".into());
        }
        self.ensure_task();
        Ok(())
    }
}

impl Drop for WsProvider {
    fn drop(&mut self) {
        if let Some(conn) = lock(&self.conn).take() {
            conn.close(CLOSE_NORMAL, String::new());
        }
    }
}

impl std::fmt::Debug for WsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsProvider")
            .field("status", &*lock(&self.shared.status))
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Scheme and host of `url`; the path often carries an API key.
fn endpoint(url: &str) -> &str {
    let host_start = url.find("://").map_or(0, |i| i + 3);
    match url[host_start..].find('/') {
        Some(i) => &url[..host_start + i],
        None => url,
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

enum ConnectionEnd {
    /// Closed on request; events already emitted.
    Shutdown,
    /// Lost the socket; may reconnect.
    Dropped { code: u16, reason: String },
}

/// Background task that owns the WebSocket connection.
async fn ws_task(
    shared: Arc<Shared>,
    mut cmd_rx: mpsc::UnboundedReceiver<Outgoing>,
    mut shutdown: watch::Receiver<CloseRequest>,
    config: WsConfig,
) {
    let mut pending = Pending::new();
    let mut next_wire_id = 1u64;
    let mut failures = 0u32;
    let mut backoff = config.reconnect_initial;

    loop {
        shared.set_status(ConnectionStatus::Connecting);
        tracing::info!(endpoint = endpoint(&shared.url), "connecting via WebSocket");

        let conn = tokio::select! {
            conn = tokio_tungstenite::connect_async(shared.url.as_str()) => conn,
            _ = shutdown.changed() => {
                abandon(&shared, &mut cmd_rx, "connection closed by client");
                return;
            }
        };

        let (code, reason) = match conn {
            Err(e) => {
                tracing::warn!(error = %e, "WS connect failed");
                (CLOSE_ABNORMAL, e.to_string())
            }
            Ok((ws_stream, _)) => {
                failures = 0;
                backoff = config.reconnect_initial;
                shared.set_status(ConnectionStatus::Connected);
                shared.events.emit(&ProviderEvent::Connect {
                    url: shared.url.clone(),
                });

                let end = run_connection(
                    ws_stream,
                    &shared,
                    &mut cmd_rx,
                    &mut shutdown,
                    &mut pending,
                    &mut next_wire_id,
                )
                .await;
                match end {
                    ConnectionEnd::Shutdown => return,
                    ConnectionEnd::Dropped { code, reason } => (code, reason),
                }
            }
        };

        fail_pending(&mut pending, &reason);
        shared.set_status(ConnectionStatus::Disconnected);
        shared.events.emit(&ProviderEvent::Disconnect {
            code,
            reason: reason.clone(),
        });

        failures += 1;
        if !config.auto_reconnect || failures > config.max_reconnect_attempts {
            tracing::error!(failures, reason = %reason, "WS connection lost; giving up");
            abandon(&shared, &mut cmd_rx, &reason);
            return;
        }

        tracing::warn!(code, "WS disconnected, reconnecting in {backoff:?}");
        tokio::select! {
            _ = time::sleep(backoff) => {}
            _ = shutdown.changed() => {
                abandon(&shared, &mut cmd_rx, "connection closed by client");
                return;
            }
        }
        backoff = (backoff * 2).min(config.reconnect_max);
    }
}

/// Pump one open socket until it drops or a close is requested.
async fn run_connection(
    ws_stream: WsStream,
    shared: &Shared,
    cmd_rx: &mut mpsc::UnboundedReceiver<Outgoing>,
    shutdown: &mut watch::Receiver<CloseRequest>,
    pending: &mut Pending,
    next_wire_id: &mut u64,
) -> ConnectionEnd {
    let (mut sink, mut stream) = ws_stream.split();

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                let request = close_request(shutdown);
                return close(&mut sink, shared, pending, request).await;
            }
            out = cmd_rx.recv() => {
                let Some(Outgoing { mut req, tx }) = out else {
                    let request = close_request(shutdown);
                    return close(&mut sink, shared, pending, request).await;
                };
                let wire_id = *next_wire_id;
                *next_wire_id += 1;
                let caller_id = std::mem::replace(&mut req.id, RpcId::Number(wire_id));
                let text = match serde_json::to_string(&req) {
                    Ok(text) => text,
                    Err(e) => {
                        let _ = tx.send(Err(e.into()));
                        continue;
                    }
                };
                pending.insert(wire_id, (caller_id, tx));
                if let Err(e) = sink.send(Message::Text(text.into())).await {
                    return ConnectionEnd::Dropped { code: CLOSE_ABNORMAL, reason: e.to_string() };
                }
            }
            msg = stream.next() => {
                match msg {
                    None => {
                        return ConnectionEnd::Dropped {
                            code: CLOSE_ABNORMAL,
                            reason: "stream closed".into(),
                        };
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "WS receive error");
                        return ConnectionEnd::Dropped { code: CLOSE_ABNORMAL, reason: e.to_string() };
                    }
                    Some(Ok(Message::Text(text))) => handle_message(text.as_str(), shared, pending),
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = frame
                            .map(|f| (u16::from(f.code), f.reason.to_string()))
                            .unwrap_or((CLOSE_NO_STATUS, String::new()));
                        return ConnectionEnd::Dropped { code, reason };
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

fn close_request(shutdown: &watch::Receiver<CloseRequest>) -> (u16, String) {
    shutdown
        .borrow()
        .clone()
        .unwrap_or((CLOSE_NORMAL, String::new()))
}

async fn close(
    sink: &mut WsSink,
    shared: &Shared,
    pending: &mut Pending,
    (code, reason): (u16, String),
) -> ConnectionEnd {
    let frame = CloseFrame {
        code: CloseCode::from(code),
        reason: reason.clone().into(),
    };
    if let Err(e) = sink.send(Message::Close(Some(frame))).await {
        tracing::debug!(error = %e, "WS close frame not delivered");
    }

    fail_pending(pending, "connection closed by client");
    shared.set_status(ConnectionStatus::Disconnected);
    shared.events.emit(&ProviderEvent::Disconnect { code, reason });
    ConnectionEnd::Shutdown
}

fn fail_pending(pending: &mut Pending, reason: &str) {
    for (_, (_, tx)) in pending.drain() {
        let _ = tx.send(Err(TransportError::WebSocket(format!(
            "connection lost: {reason}"
        ))));
    }
}

/// Stop accepting requests and fail everything still queued.
fn abandon(shared: &Shared, cmd_rx: &mut mpsc::UnboundedReceiver<Outgoing>, reason: &str) {
    cmd_rx.close();
    while let Ok(Outgoing { tx, .. }) = cmd_rx.try_recv() {
        let _ = tx.send(Err(TransportError::WebSocket(format!(
            "not connected: {reason}"
        ))));
    }
    shared.set_status(ConnectionStatus::Disconnected);
}

fn handle_message(text: &str, shared: &Shared, pending: &mut Pending) {
    let Ok(val) = serde_json::from_str::<Value>(text) else {
        tracing::debug!("failed to parse WS message as JSON");
        return;
    };

    // Server push (subscription notification or other request-shaped message)
    if let Some(method) = val.get("method").and_then(Value::as_str) {
        let data = val.get("params").cloned().unwrap_or(Value::Null);
        if method != SUBSCRIPTION_METHOD {
            tracing::trace!(method, "unsolicited WS message");
        }
        shared.events.emit(&ProviderEvent::Message {
            kind: method.to_string(),
            data,
        });
        return;
    }

    match serde_json::from_value::<JsonRpcResponse>(val) {
        Ok(mut resp) => {
            let entry = match resp.id {
                RpcId::Number(wire_id) => pending.remove(&wire_id),
                _ => None,
            };
            match entry {
                Some((caller_id, tx)) => {
                    resp.id = caller_id;
                    let _ = tx.send(Ok(resp));
                }
                None => tracing::debug!(id = %resp.id, "WS response for unknown request id"),
            }
        }
        Err(e) => tracing::debug!(error = %e, "WS message is not a JSON-RPC response"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_drops_the_path() {
        assert_eq!(
            endpoint("wss://eth-mainnet.g.alchemy.com/v2/secret"),
            "wss://eth-mainnet.g.alchemy.com"
        );
        assert_eq!(endpoint("ws://127.0.0.1:8546"), "ws://127.0.0.1:8546");
    }
}

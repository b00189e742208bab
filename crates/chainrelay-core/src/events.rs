//! Provider lifecycle events and a small listener registry.
//!
//! Transports that hold a connection own an [`EventEmitter`] and emit
//! [`ProviderEvent`]s into it; the facade forwards listener registration to
//! that emitter. Listeners are identified by the [`ListenerId`] returned at
//! registration since closures cannot be compared.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

pub const CONNECT: &str = "connect";
pub const DISCONNECT: &str = "disconnect";
pub const CHAIN_CHANGED: &str = "chainChanged";
pub const ACCOUNTS_CHANGED: &str = "accountsChanged";
pub const MESSAGE: &str = "message";

/// An event raised by a transport provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    /// The connection to `url` is open.
    Connect { url: String },
    /// The connection closed. `code` follows WebSocket close codes.
    Disconnect { code: u16, reason: String },
    ChainChanged { chain_id: String },
    AccountsChanged { accounts: Vec<String> },
    /// A server push that is not a reply, e.g. an `eth_subscription` notification.
    Message { kind: String, data: Value },
    /// Anything else, dispatched under its own name.
    Other { name: String, data: Value },
}

impl ProviderEvent {
    /// Event name listeners register under.
    pub fn name(&self) -> &str {
        match self {
            Self::Connect { .. } => CONNECT,
            Self::Disconnect { .. } => DISCONNECT,
            Self::ChainChanged { .. } => CHAIN_CHANGED,
            Self::AccountsChanged { .. } => ACCOUNTS_CHANGED,
            Self::Message { .. } => MESSAGE,
            Self::Other { name, .. } => name,
        }
    }
}

/// Handle returned by [`EventEmitter::on`] / [`EventEmitter::once`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type Listener = Arc<dyn Fn(&ProviderEvent) + Send + Sync>;

struct Registration {
    id: ListenerId,
    once: bool,
    listener: Listener,
}

/// Thread-safe registry of event listeners keyed by event name.
#[derive(Default)]
pub struct EventEmitter {
    listeners: Mutex<HashMap<String, Vec<Registration>>>,
    next_id: AtomicU64,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for every future `event`.
    pub fn on<F>(&self, event: &str, listener: F) -> ListenerId
    where
        F: Fn(&ProviderEvent) + Send + Sync + 'static,
    {
        self.register(event, Arc::new(listener), false)
    }

    /// Register `listener` for the next `event` only.
    pub fn once<F>(&self, event: &str, listener: F) -> ListenerId
    where
        F: Fn(&ProviderEvent) + Send + Sync + 'static,
    {
        self.register(event, Arc::new(listener), true)
    }

    /// Remove one listener. Returns `false` if it was not registered under `event`.
    pub fn remove_listener(&self, event: &str, id: ListenerId) -> bool {
        let mut listeners = self.lock();
        let Some(regs) = listeners.get_mut(event) else {
            return false;
        };
        let before = regs.len();
        regs.retain(|r| r.id != id);
        let removed = regs.len() != before;
        if regs.is_empty() {
            listeners.remove(event);
        }
        removed
    }

    /// Remove every listener for `event`, or every listener at all when `None`.
    /// Returns how many were removed.
    pub fn remove_all_listeners(&self, event: Option<&str>) -> usize {
        let mut listeners = self.lock();
        match event {
            Some(name) => listeners.remove(name).map_or(0, |regs| regs.len()),
            None => listeners.drain().map(|(_, regs)| regs.len()).sum(),
        }
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.lock().get(event).map_or(0, Vec::len)
    }

    /// Deliver `event` to its listeners in registration order.
    ///
    /// Listeners run after the registry lock is released, so they may
    /// register or remove listeners themselves. Returns `true` if any
    /// listener ran.
    pub fn emit(&self, event: &ProviderEvent) -> bool {
        let to_call: Vec<Listener> = {
            let mut listeners = self.lock();
            let Some(regs) = listeners.get_mut(event.name()) else {
                return false;
            };
            let called: Vec<Listener> = regs.iter().map(|r| r.listener.clone()).collect();
            regs.retain(|r| !r.once);
            if regs.is_empty() {
                listeners.remove(event.name());
            }
            called
        };

        tracing::trace!(event = event.name(), listeners = to_call.len(), "emitting provider event");
        for listener in &to_call {
            listener(event);
        }
        !to_call.is_empty()
    }

    fn register(&self, event: &str, listener: Listener, once: bool) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock()
            .entry(event.to_string())
            .or_default()
            .push(Registration { id, once, listener });
        id
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Registration>>> {
        // A panicking listener never runs under the lock, so the map is intact.
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<String, usize> = self
            .lock()
            .iter()
            .map(|(name, regs)| (name.clone(), regs.len()))
            .collect();
        f.debug_struct("EventEmitter").field("listeners", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl Fn(&ProviderEvent) + Send + Sync + 'static) {
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = hits.clone();
        (hits, move |_: &ProviderEvent| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn connect_event() -> ProviderEvent {
        ProviderEvent::Connect {
            url: "wss://node".into(),
        }
    }

    #[test]
    fn on_fires_every_time() {
        let emitter = EventEmitter::new();
        let (hits, listener) = counter();
        emitter.on(CONNECT, listener);

        assert!(emitter.emit(&connect_event()));
        assert!(emitter.emit(&connect_event()));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn once_fires_a_single_time() {
        let emitter = EventEmitter::new();
        let (hits, listener) = counter();
        emitter.once(CONNECT, listener);

        emitter.emit(&connect_event());
        assert!(!emitter.emit(&connect_event()));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(emitter.listener_count(CONNECT), 0);
    }

    #[test]
    fn listener_receives_the_emitted_event() {
        let emitter = EventEmitter::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        emitter.on(DISCONNECT, move |ev| seen_clone.lock().unwrap().push(ev.clone()));

        let ev = ProviderEvent::Disconnect {
            code: 1000,
            reason: "bye".into(),
        };
        emitter.emit(&ev);
        assert_eq!(*seen.lock().unwrap(), vec![ev]);
    }

    #[test]
    fn remove_listener_only_touches_that_listener() {
        let emitter = EventEmitter::new();
        let (hits_a, a) = counter();
        let (hits_b, b) = counter();
        let id_a = emitter.on(CONNECT, a);
        emitter.on(CONNECT, b);

        assert!(emitter.remove_listener(CONNECT, id_a));
        assert!(!emitter.remove_listener(CONNECT, id_a));
        assert!(!emitter.remove_listener(DISCONNECT, id_a));

        emitter.emit(&connect_event());
        assert_eq!(hits_a.load(Ordering::SeqCst), 0);
        assert_eq!(hits_b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn remove_all_listeners_by_name_and_globally() {
        let emitter = EventEmitter::new();
        let (_, a) = counter();
        let (_, b) = counter();
        let (_, c) = counter();
        emitter.on(ACCOUNTS_CHANGED, a);
        emitter.on(ACCOUNTS_CHANGED, b);
        emitter.on(CHAIN_CHANGED, c);

        assert_eq!(emitter.remove_all_listeners(Some(ACCOUNTS_CHANGED)), 2);
        assert_eq!(emitter.listener_count(CHAIN_CHANGED), 1);
        assert_eq!(emitter.remove_all_listeners(None), 1);
        assert_eq!(emitter.listener_count(CHAIN_CHANGED), 0);
    }

    #[test]
    fn custom_names_dispatch_as_is() {
        let emitter = EventEmitter::new();
        let (hits, listener) = counter();
        emitter.on("eth_subscription", listener);

        emitter.emit(&ProviderEvent::Other {
            name: "eth_subscription".into(),
            data: Value::Null,
        });
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn listener_may_reenter_emitter() {
        let emitter = Arc::new(EventEmitter::new());
        let inner = emitter.clone();
        emitter.on(CONNECT, move |_| {
            inner.remove_all_listeners(Some(CONNECT));
        });

        assert!(emitter.emit(&connect_event()));
        assert_eq!(emitter.listener_count(CONNECT), 0);
    }
}

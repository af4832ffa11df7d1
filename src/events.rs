//! Registry of open server-to-client push channels.
//!
//! One channel per `/api/events` connection. Channels are unbounded mpsc
//! senders; the SSE handler drains the receiving half. Broadcast is
//! best-effort: a channel whose receiver is gone is dropped from the set
//! without affecting delivery to the others.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::mpsc;

/// Event name for pushed metric mutations, shared by the scheduler and the
/// explicit refresh endpoint so clients cannot tell them apart.
pub const METRICS_UPDATE_EVENT: &str = "metrics-update";
/// Event name for the initial server acknowledgement on a new channel.
pub const CONNECTED_EVENT: &str = "connected";

/// One wire frame: a named event with a JSON payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushFrame {
    pub event: String,
    pub data: String,
}

impl PushFrame {
    pub fn new<T: Serialize>(event: &str, payload: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            event: event.to_string(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(u64);

struct Channel {
    id: ChannelId,
    tx: mpsc::UnboundedSender<PushFrame>,
}

struct Registry {
    next_id: u64,
    channels: Vec<Channel>,
}

/// Cloneable handle to the shared active-channel set. Held by the app state
/// for the lifetime of the process; channels are added on connect and
/// removed on disconnect or on a failed write.
#[derive(Clone)]
pub struct ConnectionRegistry {
    inner: Arc<Mutex<Registry>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry {
                next_id: 0,
                channels: Vec::new(),
            })),
        }
    }

    /// Open a fresh push channel and add it to the active set.
    pub fn register(&self) -> (ChannelId, mpsc::UnboundedReceiver<PushFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut registry = self.inner.lock().expect("registry lock poisoned");
        registry.next_id += 1;
        let id = ChannelId(registry.next_id);
        registry.channels.push(Channel { id, tx });
        tracing::debug!(channel_id = id.0, connections = registry.channels.len(), "Channel registered");
        (id, rx)
    }

    /// Remove a channel. No-op if already absent, so the disconnect path and
    /// a failed broadcast write can both remove the same channel safely.
    pub fn unregister(&self, id: ChannelId) {
        let mut registry = self.inner.lock().expect("registry lock poisoned");
        let before = registry.channels.len();
        registry.channels.retain(|c| c.id != id);
        if registry.channels.len() < before {
            tracing::debug!(channel_id = id.0, connections = registry.channels.len(), "Channel unregistered");
        }
    }

    /// Send a named event with a JSON payload to every registered channel.
    /// A failed write drops that channel and delivery continues; `retain`
    /// visits every entry exactly once even as failures are removed.
    pub fn broadcast<T: Serialize>(&self, event: &str, payload: &T) {
        let frame = match PushFrame::new(event, payload) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(event, error = %e, "Dropping broadcast: payload failed to serialize");
                return;
            }
        };

        let mut registry = self.inner.lock().expect("registry lock poisoned");
        let before = registry.channels.len();
        registry.channels.retain(|channel| {
            match channel.tx.send(frame.clone()) {
                Ok(()) => true,
                Err(_) => {
                    tracing::warn!(
                        channel_id = channel.id.0,
                        event,
                        "Dropping dead channel during broadcast"
                    );
                    false
                }
            }
        });
        tracing::debug!(
            event,
            delivered = registry.channels.len(),
            dropped = before - registry.channels.len(),
            "Broadcast complete"
        );
    }

    pub fn connection_count(&self) -> usize {
        self.inner.lock().expect("registry lock poisoned").channels.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

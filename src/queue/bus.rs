//! Typed event channels with optional cluster fan-out.
//!
//! Each channel carries one event type. Publishing calls the listeners
//! registered on this node synchronously. Remote listeners additionally get
//! events published on other nodes: the event is serialized to JSON, wrapped
//! in an [`Envelope`] tagged with the origin node, and broadcast on the
//! [`ClusterLink`]. Delivery is best-effort and unacknowledged.

use std::sync::{Arc, Weak};

use log::{debug, warn};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::Result;

/// Receives events from a [`Channel`].
pub trait Listener<E>: Send + Sync {
    fn name(&self) -> &str;

    fn on_event(&self, event: &E);
}

/// A serialized event on the cluster link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub origin: Uuid,
    pub channel: String,
    pub payload: String,
}

/// Broadcast transport shared by every node of a cluster.
#[derive(Debug, Clone)]
pub struct ClusterLink {
    sender: broadcast::Sender<Envelope>,
}

impl ClusterLink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        ClusterLink { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.sender.subscribe()
    }

    /// Send `envelope` to every subscribed node. Returns how many received it.
    pub fn send(&self, envelope: Envelope) -> usize {
        // No subscribers just means no other node is listening.
        self.sender.send(envelope).unwrap_or(0)
    }
}

type Listeners<E> = RwLock<Vec<Arc<dyn Listener<E>>>>;

pub struct Channel<E> {
    name: String,
    node_id: Uuid,
    local: Listeners<E>,
    remote: Listeners<E>,
    link: Option<ClusterLink>,
}

impl<E> Channel<E>
where
    E: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// A channel visible only on this node.
    pub fn local(name: impl Into<String>) -> Self {
        Self::new(name, Uuid::new_v4(), None)
    }

    pub fn new(name: impl Into<String>, node_id: Uuid, link: Option<ClusterLink>) -> Self {
        Channel {
            name: name.into(),
            node_id,
            local: RwLock::new(Vec::new()),
            remote: RwLock::new(Vec::new()),
            link,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_id(&self) -> Uuid {
        self.node_id
    }

    /// Listen to events published on this node only.
    pub fn register_local(&self, listener: Arc<dyn Listener<E>>) {
        self.local.write().push(listener);
    }

    /// Listen to events published on this node and on every other node.
    pub fn register_remote(&self, listener: Arc<dyn Listener<E>>) {
        self.remote.write().push(listener);
    }

    /// Deliver `event` to this node's listeners, then broadcast it.
    pub fn publish(&self, event: &E) -> Result<()> {
        let listeners: Vec<_> = {
            let local = self.local.read();
            let remote = self.remote.read();
            local.iter().chain(remote.iter()).cloned().collect()
        };
        for listener in listeners {
            listener.on_event(event);
        }

        if let Some(link) = &self.link {
            let envelope = Envelope {
                origin: self.node_id,
                channel: self.name.clone(),
                payload: serde_json::to_string(event)?,
            };
            let receivers = link.send(envelope);
            debug!("broadcast on '{}' reached {} receivers", self.name, receivers);
        }
        Ok(())
    }

    /// Hand an envelope from the cluster to the remote listeners.
    ///
    /// Envelopes for other channels and envelopes this node sent itself are
    /// ignored. Returns whether the envelope was delivered.
    pub fn deliver(&self, envelope: &Envelope) -> bool {
        if envelope.channel != self.name || envelope.origin == self.node_id {
            return false;
        }
        let event: E = match serde_json::from_str(&envelope.payload) {
            Ok(event) => event,
            Err(e) => {
                warn!(
                    "dropping malformed event on '{}' from node {}: {}",
                    self.name, envelope.origin, e
                );
                return false;
            }
        };

        let listeners: Vec<_> = self.remote.read().iter().cloned().collect();
        for listener in listeners {
            listener.on_event(&event);
        }
        true
    }

    /// Start delivering cluster envelopes to the remote listeners.
    ///
    /// Must be called inside a tokio runtime. Returns `None` for channels
    /// without a cluster link. The task ends when the link closes or the
    /// channel is dropped.
    pub fn spawn_receiver(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let mut receiver = self.link.as_ref()?.subscribe();
        let channel: Weak<Self> = Arc::downgrade(self);
        let name = self.name.clone();

        Some(tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(envelope) => {
                        let Some(channel) = channel.upgrade() else {
                            break;
                        };
                        channel.deliver(&envelope);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("cluster receiver on '{name}' lagged, {skipped} events lost");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("cluster receiver on '{name}' stopped");
        }))
    }
}

//! Connection hub: routes coordinator events to WebSocket connections
//!
//! Each connection registers an unbounded channel. Publishing never waits on
//! a socket, so the coordinator can publish while its lock is held.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use choicelab_core::{Audience, Broadcaster, ServerEvent};
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// What a connection task receives from the hub
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Serialize and send this event
    Event(ServerEvent),
    /// Close the socket
    Close,
}

struct ConnectionHandle {
    tx: mpsc::UnboundedSender<Outbound>,
    admin: bool,
}

/// Registry of live connections implementing [`Broadcaster`]
#[derive(Default)]
pub struct ConnectionHub {
    connections: RwLock<HashMap<String, ConnectionHandle>>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection and return the receiving end of its channel
    pub fn register(&self, id: &str) -> mpsc::UnboundedReceiver<Outbound> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.write().insert(id.to_string(), ConnectionHandle { tx, admin: false });
        debug!(connection = %id, "Connection registered");
        rx
    }

    /// Forget a connection; called by its task on the way out
    pub fn unregister(&self, id: &str) {
        if self.write().remove(id).is_some() {
            debug!(connection = %id, "Connection unregistered");
        }
    }

    pub fn connection_count(&self) -> usize {
        self.read().len()
    }

    pub fn admin_count(&self) -> usize {
        self.read().values().filter(|c| c.admin).count()
    }

    pub fn is_admin(&self, id: &str) -> bool {
        self.read().get(id).is_some_and(|c| c.admin)
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, ConnectionHandle>> {
        self.connections.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, ConnectionHandle>> {
        self.connections.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Send to one connection; a closed receiver just means it is going away
    fn send_to(id: &str, handle: &ConnectionHandle, outbound: Outbound) -> bool {
        let delivered = handle.tx.send(outbound).is_ok();
        if !delivered {
            trace!(connection = %id, "Dropped event for closing connection");
        }
        delivered
    }
}

impl Broadcaster for ConnectionHub {
    fn publish(&self, audience: Audience, event: ServerEvent) {
        let connections = self.read();
        let sent = match &audience {
            Audience::Individual(id) => connections
                .get(id)
                .map(|handle| Self::send_to(id, handle, Outbound::Event(event.clone())))
                .unwrap_or(false) as usize,
            Audience::AdminGroup => connections
                .iter()
                .filter(|(_, handle)| handle.admin)
                .filter(|(id, handle)| Self::send_to(id, handle, Outbound::Event(event.clone())))
                .count(),
            Audience::All => connections
                .iter()
                .filter(|(id, handle)| Self::send_to(id, handle, Outbound::Event(event.clone())))
                .count(),
        };
        trace!("Published {} to {:?} ({} connections)", event.kind(), audience, sent);
    }

    fn subscribe_admin(&self, id: &str) {
        if let Some(handle) = self.write().get_mut(id) {
            handle.admin = true;
        }
    }

    fn disconnect(&self, id: &str) {
        if let Some(handle) = self.read().get(id) {
            Self::send_to(id, handle, Outbound::Close);
        }
    }
}

//! In-memory Broadcaster implementation
//!
//! MemoryBroadcaster records every publish instead of delivering it. It
//! resolves audiences the same way a transport would, which makes it the
//! natural test double for the coordinator.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use super::{Audience, Broadcaster, ServerEvent};

#[derive(Debug, Default)]
struct Recorded {
    published: Vec<(Audience, ServerEvent)>,
    admins: HashSet<String>,
    disconnected: Vec<String>,
}

/// Broadcaster that keeps everything in memory
#[derive(Debug, Default)]
pub struct MemoryBroadcaster {
    inner: Mutex<Recorded>,
}

impl MemoryBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Every (audience, event) pair published so far
    pub fn published(&self) -> Vec<(Audience, ServerEvent)> {
        self.lock().published.clone()
    }

    /// Events addressed to the admin audience
    pub fn admin_events(&self) -> Vec<ServerEvent> {
        self.lock()
            .published
            .iter()
            .filter(|(audience, _)| *audience == Audience::AdminGroup)
            .map(|(_, event)| event.clone())
            .collect()
    }

    /// Events a given connection would have received
    ///
    /// Includes broadcasts to everyone and, for admin subscribers, admin
    /// broadcasts.
    pub fn events_for(&self, id: &str) -> Vec<ServerEvent> {
        let recorded = self.lock();
        let is_admin = recorded.admins.contains(id);
        recorded
            .published
            .iter()
            .filter(|(audience, _)| match audience {
                Audience::Individual(target) => target == id,
                Audience::AdminGroup => is_admin,
                Audience::All => true,
            })
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub fn is_admin(&self, id: &str) -> bool {
        self.lock().admins.contains(id)
    }

    /// Connections that were forcibly closed, in order
    pub fn disconnected(&self) -> Vec<String> {
        self.lock().disconnected.clone()
    }

    /// Forget everything published so far, keeping admin subscriptions
    pub fn clear(&self) {
        let mut recorded = self.lock();
        recorded.published.clear();
        recorded.disconnected.clear();
    }
}

impl Broadcaster for MemoryBroadcaster {
    fn publish(&self, audience: Audience, event: ServerEvent) {
        self.lock().published.push((audience, event));
    }

    fn subscribe_admin(&self, id: &str) {
        self.lock().admins.insert(id.to_string());
    }

    fn disconnect(&self, id: &str) {
        let mut recorded = self.lock();
        recorded.admins.remove(id);
        recorded.disconnected.push(id.to_string());
    }
}

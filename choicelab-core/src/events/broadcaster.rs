//! Broadcaster trait definition
//!
//! The coordinator never sees connections. It addresses events to an
//! [`Audience`] and the transport resolves that to sockets.

use super::{Audience, ServerEvent};

/// Delivery boundary between the coordinator and the transport
///
/// Implementations must not block: the coordinator publishes while holding
/// exclusive access to session state.
pub trait Broadcaster: Send + Sync {
    /// Deliver `event` to every connection in `audience`
    fn publish(&self, audience: Audience, event: ServerEvent);

    /// Add a connection to the admin audience
    fn subscribe_admin(&self, id: &str);

    /// Forcibly close a connection
    fn disconnect(&self, id: &str);
}

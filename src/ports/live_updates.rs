//! LiveUpdates port - Fan-out of back-office mutations to live sessions.
//!
//! The CRUD layer and the order pipeline publish here; the WebSocket hub
//! decides which room receives each event from its type.

use crate::domain::realtime::Event;

/// Port for pushing events to connected sessions.
///
/// Publishing never blocks and never fails from the caller's point of view;
/// delivery is best effort.
pub trait LiveUpdates: Send + Sync {
    fn publish(&self, event: Event);
}

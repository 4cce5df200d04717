//! Inbound event dispatch.
//!
//! Every decoded frame from a connection lands here. Dispatch is an
//! exhaustive `match` over [`EventType`]; each arm mutates the aggregator or
//! issuer and asks the hub to fan out whatever follows from it.
//!
//! # Event Flow
//!
//! ```text
//!   reader loop ──Frame──▶ EventRouter::dispatch_frame
//!                               │
//!          ┌────────────────────┼─────────────────────┐
//!          ▼                    ▼                     ▼
//!   visit / view           authadmin            relay events
//!   VisitAggregator        TokenIssuer          (admin senders only)
//!          │                    │                     │
//!          └───── HubHandle::broadcast / promote ─────┘
//! ```
//!
//! Every error here is scoped to one event: the reader logs it and keeps
//! the connection open.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::analytics::{Visit, VisitAggregator};
use crate::domain::auth::TokenIssuer;
use crate::domain::foundation::ClientId;
use crate::domain::realtime::{
    AdminAuthPayload, Event, EventType, Frame, Room, RoomFilter, UnknownEventType,
};

use super::hub::HubHandle;

/// Why one inbound event was not applied.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    UnknownEventType(#[from] UnknownEventType),

    #[error("invalid '{kind}' payload: {source}")]
    InvalidPayload {
        kind: EventType,
        #[source]
        source: serde_json::Error,
    },

    #[error("admin token rejected")]
    InvalidToken,

    #[error("'{0}' may only be sent by admin connections")]
    Forbidden(EventType),

    #[error("'{0}' is never accepted from clients")]
    NotAccepted(EventType),

    #[error("no live visit for this connection")]
    UnknownVisit,
}

/// What the router knows about the connection an event came from.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub client_id: ClientId,
    pub ip: String,
    pub referrer: String,
    pub user_agent: String,
}

impl ConnectionInfo {
    pub fn new(client_id: ClientId) -> Self {
        Self {
            client_id,
            ip: String::new(),
            referrer: String::new(),
            user_agent: String::new(),
        }
    }
}

/// Dispatches inbound events to their handlers.
#[derive(Clone)]
pub struct EventRouter {
    hub: HubHandle,
    aggregator: Arc<VisitAggregator>,
    tokens: Arc<TokenIssuer>,
}

impl EventRouter {
    pub fn new(hub: HubHandle, aggregator: Arc<VisitAggregator>, tokens: Arc<TokenIssuer>) -> Self {
        Self {
            hub,
            aggregator,
            tokens,
        }
    }

    /// Resolve the frame's tag, then dispatch.
    pub async fn dispatch_frame(
        &self,
        conn: &ConnectionInfo,
        frame: Frame,
    ) -> Result<(), DispatchError> {
        let event = Event::try_from(frame)?;
        self.dispatch(conn, event).await
    }

    pub async fn dispatch(&self, conn: &ConnectionInfo, event: Event) -> Result<(), DispatchError> {
        tracing::trace!(client_id = %conn.client_id, event_type = %event.kind, "Dispatching event");

        match event.kind {
            EventType::VisitStart => {
                let visit = Visit::start(
                    conn.client_id,
                    conn.ip.clone(),
                    conn.referrer.clone(),
                    conn.user_agent.clone(),
                );
                if !self.aggregator.add_visit(visit) {
                    tracing::debug!(client_id = %conn.client_id, "Visit already started");
                }
                self.push_visitor_count();
                Ok(())
            }
            EventType::ViewIncrement => {
                if !self.aggregator.increment_views(&conn.client_id) {
                    return Err(DispatchError::UnknownVisit);
                }
                self.push_visitor_count();
                Ok(())
            }
            EventType::AdminAuth => {
                let payload: AdminAuthPayload = serde_json::from_value(event.payload)
                    .map_err(|source| DispatchError::InvalidPayload {
                        kind: EventType::AdminAuth,
                        source,
                    })?;
                if !self.tokens.verify(&payload.otp) {
                    return Err(DispatchError::InvalidToken);
                }
                self.hub.promote(conn.client_id);
                // The new dashboard gets the current count straight away.
                self.push_visitor_count();
                Ok(())
            }
            EventType::SettingsChanged
            | EventType::CategoryCreated
            | EventType::CategoryRemoved
            | EventType::ProductCreated
            | EventType::ProductUpdated
            | EventType::ProductRemoved
            | EventType::OrdersChanged
            | EventType::CustomersChanged => self.relay(conn, event).await,
            EventType::VisitorCountUpdate => Err(DispatchError::NotAccepted(event.kind)),
        }
    }

    async fn relay(&self, conn: &ConnectionInfo, event: Event) -> Result<(), DispatchError> {
        if self.hub.room_of(conn.client_id).await != Some(Room::Admin) {
            return Err(DispatchError::Forbidden(event.kind));
        }
        let Some(filter) = event.kind.relay_audience() else {
            return Err(DispatchError::NotAccepted(event.kind));
        };
        self.hub.broadcast(event, filter);
        Ok(())
    }

    fn push_visitor_count(&self) {
        self.hub.broadcast(
            Event::visitor_count(self.aggregator.current_count()),
            RoomFilter::AdminOnly,
        );
    }
}

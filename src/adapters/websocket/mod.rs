//! WebSocket adapters for live storefront and dashboard updates.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Upgrade endpoint (GET /ws)                       │
//! │   - Origin check                                                     │
//! │   - Captures referrer, user agent, remote address                    │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ one per socket
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │              read_loop  ──▶  EventRouter                             │
//! │              write_loop ◀──  bounded outbound queue                  │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ HubHandle commands
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                           Hub actor                                  │
//! │   Room: base                 Room: admin                             │
//! │   ├── shopper-a              ├── dashboard-x                         │
//! │   ├── shopper-b              └── dashboard-y                         │
//! │   └── shopper-c                                                      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`hub`] - Client registry, rooms and broadcast
//! - [`router`] - Inbound event dispatch
//! - [`client`] - Per-connection read/write loops and heartbeat
//! - [`handler`] - Axum WebSocket upgrade handler

pub mod client;
pub mod handler;
pub mod hub;
pub mod router;

pub use client::{serve_connection, ConnectionSettings};
pub use handler::{origin_allowed, websocket_router, ws_handler, WebSocketState};
pub use hub::{ClientEntry, Hub, HubHandle};
pub use router::{ConnectionInfo, DispatchError, EventRouter};

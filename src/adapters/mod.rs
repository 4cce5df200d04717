//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - Back-office credential check
//! - `http` - axum application: storefront API plus the socket upgrade
//! - `memory` - In-memory stores standing in for the CRUD back end
//! - `notification` - Order notifications
//! - `payment` - Forwarded payment provider events
//! - `websocket` - Hub, connection loops and inbound event dispatch

pub mod auth;
pub mod http;
pub mod memory;
pub mod notification;
pub mod payment;
pub mod websocket;

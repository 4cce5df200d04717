//! HTTP adapter for the storefront endpoints.
//!
//! - `POST /admin/token` - One-time token for the admin socket
//! - `POST /orders` - Checkout submission
//! - `POST /webhooks/payment` - Payment confirmation
//! - `GET /healthcheck` - Liveness check

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{StorefrontAppState, PAYMENT_SIGNATURE_HEADER, SESSION_HEADER};
pub use routes::storefront_router;

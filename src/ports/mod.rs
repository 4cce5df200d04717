//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the live layer and the storefront's CRUD back end. Adapters implement
//! these ports.
//!
//! ## Analytics
//!
//! - `VisitArchive` - Durable storage for completed visits
//!
//! ## Ordering
//!
//! - `OrderPipeline` - Confirmed draft → durable order
//! - `CustomerRepository`, `OrderRepository`, `CartStore`, `OrderNotifier` -
//!   the steps the default pipeline composes
//! - `PaymentEventVerifier` - Trusted payment provider events
//!
//! ## Real-time
//!
//! - `LiveUpdates` - Fan-out of mutations to connected sessions
//! - `AdminAuthenticator` - Back-office credential check

mod admin_authenticator;
mod cart_store;
mod customer_repository;
mod live_updates;
mod order_notifier;
mod order_pipeline;
mod order_repository;
mod payment_verifier;
mod visit_archive;

pub use admin_authenticator::{AdminAuthenticator, AuthError};
pub use cart_store::CartStore;
pub use customer_repository::{CustomerRepository, CustomerUpsert};
pub use live_updates::LiveUpdates;
pub use order_notifier::OrderNotifier;
pub use order_pipeline::{OrderPipeline, OrderReceipt};
pub use order_repository::{NewOrder, OrderRepository};
pub use payment_verifier::{
    PaymentEvent, PaymentEventKind, PaymentEventVerifier, PaymentVerificationError,
};
pub use visit_archive::VisitArchive;

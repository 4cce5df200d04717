//! Checkout ordering: draft orders and the staging cache that holds them
//! until payment is confirmed.

mod draft;
mod errors;
mod staging;

pub use draft::{ContactInfo, DraftOrder, LineItem, PaymentMethod};
pub use errors::OrderError;
pub use staging::{
    Confirmation, OrderStagingCache, StagedDraft, DEFAULT_DRAFT_SWEEP_INTERVAL, DEFAULT_DRAFT_TTL,
};

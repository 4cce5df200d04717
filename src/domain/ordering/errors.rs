//! Ordering error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | Validation | 400 |
//! | EmptyCart | 400 |
//! | MissingSession | 400 |
//! | CustomerUpsert | 500 |
//! | OrderPersist | 500 |
//! | CartUnavailable | 503 |

use thiserror::Error;

use crate::domain::foundation::{DomainError, ValidationError};

/// Errors raised while staging or confirming an order.
///
/// A pipeline error always leaves the staged draft in place, so the
/// confirmation can be retried.
#[derive(Debug, Clone, Error)]
pub enum OrderError {
    #[error("Invalid order: {0}")]
    Validation(#[from] ValidationError),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Payment event carries no session id")]
    MissingSession,

    #[error("Cart could not be read: {0}")]
    CartUnavailable(DomainError),

    #[error("Customer upsert failed: {0}")]
    CustomerUpsert(DomainError),

    #[error("Order could not be persisted: {0}")]
    OrderPersist(DomainError),
}

impl OrderError {
    /// Stable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            OrderError::Validation(_) => "INVALID_ORDER",
            OrderError::EmptyCart => "EMPTY_CART",
            OrderError::MissingSession => "MISSING_SESSION",
            OrderError::CartUnavailable(_) => "CART_UNAVAILABLE",
            OrderError::CustomerUpsert(_) => "CUSTOMER_UPSERT_FAILED",
            OrderError::OrderPersist(_) => "ORDER_PERSIST_FAILED",
        }
    }

    /// Whether the caller sent something wrong, as opposed to a server fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            OrderError::Validation(_) | OrderError::EmptyCart | OrderError::MissingSession
        )
    }
}

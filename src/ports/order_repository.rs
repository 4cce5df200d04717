//! OrderRepository port - Durable order records.

use async_trait::async_trait;

use crate::domain::foundation::{CustomerId, DomainError, OrderId, Timestamp};
use crate::domain::ordering::{LineItem, PaymentMethod};

/// Everything needed to persist an order and its lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub pickup_time: Timestamp,
    pub method: PaymentMethod,
    pub items: Vec<LineItem>,
}

/// Port for order persistence.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist the order and its line items in one unit of work.
    async fn create(&self, order: &NewOrder) -> Result<OrderId, DomainError>;
}

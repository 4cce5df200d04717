//! OrderPipeline port - Turns a confirmed draft into a durable order.
//!
//! The staging cache runs the pipeline while holding the session's slot,
//! so an implementation is invoked at most once per staged draft.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::foundation::{CartSessionId, CustomerId, OrderId, Timestamp};
use crate::domain::ordering::{DraftOrder, OrderError};

/// Outcome of a completed order-creation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderReceipt {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub total_cents: u64,
    pub created_at: Timestamp,
}

/// Port for the full order-creation pipeline.
///
/// Returning `Err` means no durable order exists and the draft must be kept.
#[async_trait]
pub trait OrderPipeline: Send + Sync {
    async fn process(
        &self,
        session_id: &CartSessionId,
        draft: &DraftOrder,
    ) -> Result<OrderReceipt, OrderError>;
}

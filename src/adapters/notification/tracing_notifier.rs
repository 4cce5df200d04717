//! Order notifier that records notifications in the log.
//!
//! Email receipts and owner alerts are produced by the CRUD back end; this
//! adapter stands in for it wherever the live core runs on its own.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::ordering::DraftOrder;
use crate::ports::{OrderNotifier, OrderReceipt};

/// Logs one structured line per placed order.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingOrderNotifier;

#[async_trait]
impl OrderNotifier for TracingOrderNotifier {
    async fn order_placed(
        &self,
        receipt: &OrderReceipt,
        draft: &DraftOrder,
    ) -> Result<(), DomainError> {
        tracing::info!(
            order_id = %receipt.order_id,
            customer_id = %receipt.customer_id,
            total_cents = receipt.total_cents,
            method = %draft.method,
            pickup_time = %draft.pickup_time.to_rfc3339(),
            lines = draft.items.len(),
            "Order placed"
        );
        Ok(())
    }
}

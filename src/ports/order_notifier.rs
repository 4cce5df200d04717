//! OrderNotifier port - Receipts and shop-owner notifications.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::ordering::DraftOrder;

use super::OrderReceipt;

/// Port for dispatching order notifications (email receipt, push to owner).
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    async fn order_placed(&self, receipt: &OrderReceipt, draft: &DraftOrder)
        -> Result<(), DomainError>;
}

//! SubmitCheckoutHandler - Command handler for checkout form submissions.
//!
//! The shopper's cart is snapshotted into a draft and staged. Cash orders
//! are confirmed on the spot; card orders wait for the payment provider.

use std::sync::Arc;

use crate::domain::foundation::{CartSessionId, Timestamp};
use crate::domain::ordering::{
    ContactInfo, DraftOrder, OrderError, OrderStagingCache, PaymentMethod,
};
use crate::ports::{CartStore, OrderReceipt};

/// Command to submit a checkout.
#[derive(Debug, Clone)]
pub struct SubmitCheckoutCommand {
    pub session_id: CartSessionId,
    pub contact: ContactInfo,
    pub pickup_time: Timestamp,
    pub method: PaymentMethod,
}

/// Result of a checkout submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Paid at pickup; the order exists now.
    Created(OrderReceipt),
    /// Staged until the payment provider confirms.
    AwaitingPayment,
}

/// Handler for checkout submissions.
pub struct SubmitCheckoutHandler {
    carts: Arc<dyn CartStore>,
    staging: Arc<OrderStagingCache>,
}

impl SubmitCheckoutHandler {
    pub fn new(carts: Arc<dyn CartStore>, staging: Arc<OrderStagingCache>) -> Self {
        Self { carts, staging }
    }

    pub async fn handle(&self, cmd: SubmitCheckoutCommand) -> Result<CheckoutOutcome, OrderError> {
        // 1. Snapshot the cart
        let items = self
            .carts
            .line_items(&cmd.session_id)
            .await
            .map_err(OrderError::CartUnavailable)?;
        if items.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        // 2. Validate
        let draft = DraftOrder {
            contact: cmd.contact,
            pickup_time: cmd.pickup_time,
            method: cmd.method,
            items,
        };
        draft.validate(&Timestamp::now())?;

        // 3. Card orders wait for the provider
        if cmd.method.requires_confirmation() {
            self.staging.stage(&cmd.session_id, draft).await;
            tracing::info!(session_id = %cmd.session_id, "Checkout staged, awaiting payment");
            return Ok(CheckoutOutcome::AwaitingPayment);
        }

        // 4. Cash confirms immediately, in the same slot critical section
        let receipt = self.staging.stage_and_confirm(&cmd.session_id, draft).await?;
        Ok(CheckoutOutcome::Created(receipt))
    }
}

//! HandlePaymentConfirmationHandler - Command handler for payment provider events.
//!
//! A successful payment carries the cart session in its metadata; the
//! staged draft for that session becomes an order. Every other event kind
//! is acknowledged and ignored.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::ordering::{Confirmation, OrderError, OrderStagingCache};
use crate::ports::{
    OrderReceipt, PaymentEventKind, PaymentEventVerifier, PaymentVerificationError,
};

/// Command to handle a payment provider delivery.
#[derive(Debug, Clone)]
pub struct HandlePaymentConfirmationCommand {
    /// Raw event body.
    pub payload: Vec<u8>,
    /// Signature header value.
    pub signature: String,
}

/// Result of handling a payment event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentConfirmationResult {
    /// The staged draft became an order.
    OrderCreated(OrderReceipt),
    /// Payment succeeded but nothing was staged (duplicate delivery, or the
    /// draft was already confirmed or abandoned).
    NothingStaged,
    /// Event kind we do not act on.
    Ignored,
}

/// Errors from payment confirmation.
#[derive(Debug, Error)]
pub enum PaymentConfirmationError {
    #[error(transparent)]
    Verification(#[from] PaymentVerificationError),

    #[error(transparent)]
    Order(#[from] OrderError),
}

/// Handler for payment provider events.
pub struct HandlePaymentConfirmationHandler {
    verifier: Arc<dyn PaymentEventVerifier>,
    staging: Arc<OrderStagingCache>,
}

impl HandlePaymentConfirmationHandler {
    pub fn new(verifier: Arc<dyn PaymentEventVerifier>, staging: Arc<OrderStagingCache>) -> Self {
        Self { verifier, staging }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentConfirmationCommand,
    ) -> Result<PaymentConfirmationResult, PaymentConfirmationError> {
        // 1. Verify and parse
        let event = self.verifier.verify(&cmd.payload, &cmd.signature).await?;

        // 2. Process based on event kind
        match event.kind {
            PaymentEventKind::PaymentSucceeded => {
                let session_id = event.session_id.ok_or(OrderError::MissingSession)?;
                tracing::info!(event_id = %event.id, session_id = %session_id, "Payment succeeded");

                match self.staging.confirm(&session_id).await? {
                    Confirmation::Created(receipt) => {
                        Ok(PaymentConfirmationResult::OrderCreated(receipt))
                    }
                    Confirmation::NothingStaged => Ok(PaymentConfirmationResult::NothingStaged),
                }
            }
            PaymentEventKind::Other(kind) => {
                tracing::debug!(event_id = %event.id, kind = %kind, "Payment event ignored");
                Ok(PaymentConfirmationResult::Ignored)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CartSessionId, CustomerId, OrderId, Timestamp};
    use crate::domain::ordering::{
        ContactInfo, DraftOrder, LineItem, PaymentMethod, DEFAULT_DRAFT_TTL,
    };
    use crate::ports::{OrderPipeline, PaymentEvent};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    /// Returns whatever event it was built with, ignoring the input.
    struct FixedVerifier {
        event: Result<PaymentEvent, PaymentVerificationError>,
    }

    #[async_trait]
    impl PaymentEventVerifier for FixedVerifier {
        async fn verify(
            &self,
            _payload: &[u8],
            _signature: &str,
        ) -> Result<PaymentEvent, PaymentVerificationError> {
            self.event.clone()
        }
    }

    #[derive(Default)]
    struct CountingPipeline {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl OrderPipeline for CountingPipeline {
        async fn process(
            &self,
            _session_id: &CartSessionId,
            draft: &DraftOrder,
        ) -> Result<OrderReceipt, OrderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(OrderReceipt {
                order_id: OrderId::new(),
                customer_id: CustomerId::new(),
                total_cents: draft.total_cents(),
                created_at: Timestamp::now(),
            })
        }
    }

    fn session() -> CartSessionId {
        CartSessionId::new("cart-3").unwrap()
    }

    fn draft() -> DraftOrder {
        DraftOrder {
            contact: ContactInfo {
                fullname: "Ada Baker".to_string(),
                email: "ada@example.com".to_string(),
                phone: "555-0100".to_string(),
                address: String::new(),
            },
            pickup_time: Timestamp::now().plus_minutes(60),
            method: PaymentMethod::Card,
            items: vec![LineItem {
                product_id: "scone".to_string(),
                name: "Scone".to_string(),
                unit_price_cents: 325,
                quantity: 2,
            }],
        }
    }

    fn handler(
        event: Result<PaymentEvent, PaymentVerificationError>,
    ) -> (
        HandlePaymentConfirmationHandler,
        Arc<OrderStagingCache>,
        Arc<CountingPipeline>,
    ) {
        let pipeline = Arc::new(CountingPipeline::default());
        let staging = Arc::new(OrderStagingCache::new(pipeline.clone(), DEFAULT_DRAFT_TTL));
        let handler =
            HandlePaymentConfirmationHandler::new(Arc::new(FixedVerifier { event }), staging.clone());
        (handler, staging, pipeline)
    }

    fn succeeded(session_id: Option<CartSessionId>) -> PaymentEvent {
        PaymentEvent {
            id: "evt_1".to_string(),
            kind: PaymentEventKind::PaymentSucceeded,
            session_id,
        }
    }

    fn command() -> HandlePaymentConfirmationCommand {
        HandlePaymentConfirmationCommand {
            payload: b"{}".to_vec(),
            signature: "sig".to_string(),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn succeeded_payment_confirms_staged_draft() {
        let (handler, staging, pipeline) = handler(Ok(succeeded(Some(session()))));
        staging.stage(&session(), draft()).await;

        let result = handler.handle(command()).await.unwrap();

        assert!(matches!(result, PaymentConfirmationResult::OrderCreated(_)));
        assert_eq!(pipeline.calls.load(Ordering::SeqCst), 1);
        assert_eq!(staging.draft_count().await, 0);
    }

    #[tokio::test]
    async fn duplicate_delivery_is_noop() {
        let (handler, staging, pipeline) = handler(Ok(succeeded(Some(session()))));
        staging.stage(&session(), draft()).await;

        handler.handle(command()).await.unwrap();
        let second = handler.handle(command()).await.unwrap();

        assert_eq!(second, PaymentConfirmationResult::NothingStaged);
        assert_eq!(pipeline.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_session_is_an_error() {
        let (handler, _staging, _pipeline) = handler(Ok(succeeded(None)));

        let err = handler.handle(command()).await.unwrap_err();

        assert!(matches!(
            err,
            PaymentConfirmationError::Order(OrderError::MissingSession)
        ));
    }

    #[tokio::test]
    async fn other_events_are_ignored() {
        let (handler, staging, pipeline) = handler(Ok(PaymentEvent {
            id: "evt_2".to_string(),
            kind: PaymentEventKind::Other("charge.refunded".to_string()),
            session_id: Some(session()),
        }));
        staging.stage(&session(), draft()).await;

        let result = handler.handle(command()).await.unwrap();

        assert_eq!(result, PaymentConfirmationResult::Ignored);
        assert_eq!(pipeline.calls.load(Ordering::SeqCst), 0);
        assert_eq!(staging.draft_count().await, 1);
    }

    #[tokio::test]
    async fn bad_signature_is_rejected() {
        let (handler, _staging, _pipeline) =
            handler(Err(PaymentVerificationError::InvalidSignature));

        let err = handler.handle(command()).await.unwrap_err();

        assert!(matches!(
            err,
            PaymentConfirmationError::Verification(PaymentVerificationError::InvalidSignature)
        ));
    }
}

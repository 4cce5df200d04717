//! PaymentEventVerifier port - Authenticated payment provider events.
//!
//! Signature checking belongs to the provider integration. This port only
//! promises that whatever it returns came from the provider.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::foundation::CartSessionId;

/// A verified event from the payment provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentEvent {
    /// Provider event ID, useful for tracing duplicate deliveries.
    pub id: String,
    pub kind: PaymentEventKind,
    /// Cart session recovered from the payment's metadata.
    pub session_id: Option<CartSessionId>,
}

/// Payment event kinds the storefront reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum PaymentEventKind {
    /// `payment_intent.succeeded`
    PaymentSucceeded,
    /// Anything else; acknowledged and ignored.
    Other(String),
}

impl From<String> for PaymentEventKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "payment_intent.succeeded" => PaymentEventKind::PaymentSucceeded,
            _ => PaymentEventKind::Other(value),
        }
    }
}

/// Errors that can occur while verifying a payment event.
#[derive(Debug, Clone, Error)]
pub enum PaymentVerificationError {
    #[error("Invalid payment event signature")]
    InvalidSignature,

    #[error("Malformed payment event: {0}")]
    Malformed(String),
}

/// Port for turning a raw webhook delivery into a trusted event.
#[async_trait]
pub trait PaymentEventVerifier: Send + Sync {
    async fn verify(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<PaymentEvent, PaymentVerificationError>;
}

//! Payment events forwarded by the gateway integration.
//!
//! Provider signature checking happens upstream, in the gateway
//! integration that receives the provider's webhook. It forwards the raw
//! event body here with a shared forwarding secret in the signature header.
//! This adapter checks that secret and parses the event.
//!
//! Expected body (provider event envelope):
//!
//! ```json
//! {
//!   "id": "evt_123",
//!   "type": "payment_intent.succeeded",
//!   "data": { "object": { "metadata": { "session_id": "abc" } } }
//! }
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use subtle::ConstantTimeEq;

use crate::domain::foundation::CartSessionId;
use crate::ports::{PaymentEvent, PaymentEventKind, PaymentEventVerifier, PaymentVerificationError};

#[derive(Debug, Deserialize)]
struct EventEnvelope {
    id: String,
    #[serde(rename = "type")]
    kind: PaymentEventKind,
    #[serde(default)]
    data: Option<EventData>,
}

#[derive(Debug, Deserialize)]
struct EventData {
    #[serde(default)]
    object: serde_json::Value,
}

/// Verifies forwarded events against a shared secret.
pub struct ForwardedPaymentEvents {
    forward_secret: Secret<String>,
}

impl ForwardedPaymentEvents {
    pub fn new(forward_secret: Secret<String>) -> Self {
        Self { forward_secret }
    }

    fn check_secret(&self, signature: &str) -> Result<(), PaymentVerificationError> {
        let expected = self.forward_secret.expose_secret().as_bytes();
        if expected.is_empty() || expected.ct_eq(signature.as_bytes()).unwrap_u8() != 1 {
            return Err(PaymentVerificationError::InvalidSignature);
        }
        Ok(())
    }
}

/// Pull `metadata.session_id` out of the event's object, if present.
fn session_from_object(object: &serde_json::Value) -> Option<CartSessionId> {
    object
        .get("metadata")
        .and_then(|metadata| metadata.get("session_id"))
        .and_then(|value| value.as_str())
        .and_then(|raw| CartSessionId::new(raw).ok())
}

#[async_trait]
impl PaymentEventVerifier for ForwardedPaymentEvents {
    async fn verify(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<PaymentEvent, PaymentVerificationError> {
        self.check_secret(signature)?;

        let envelope: EventEnvelope = serde_json::from_slice(payload)
            .map_err(|e| PaymentVerificationError::Malformed(e.to_string()))?;

        let session_id = envelope
            .data
            .as_ref()
            .and_then(|data| session_from_object(&data.object));

        Ok(PaymentEvent {
            id: envelope.id,
            kind: envelope.kind,
            session_id,
        })
    }
}

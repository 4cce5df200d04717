//! Request and response DTOs for the storefront endpoints.

use serde::{Deserialize, Serialize};

use crate::application::{CheckoutOutcome, PaymentConfirmationResult};
use crate::domain::foundation::Timestamp;
use crate::domain::ordering::{ContactInfo, PaymentMethod};
use crate::ports::OrderReceipt;

// ════════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════════

/// Checkout form body.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    #[serde(flatten)]
    pub contact: ContactInfo,
    #[serde(rename = "pickuptime")]
    pub pickup_time: Timestamp,
    pub method: PaymentMethod,
}

// ════════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════════

/// Checkout submission result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckoutResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderSummary>,
}

/// A created order as reported to the shopper.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderSummary {
    pub order_id: String,
    pub total_cents: u64,
    pub created_at: String,
}

impl From<&OrderReceipt> for OrderSummary {
    fn from(receipt: &OrderReceipt) -> Self {
        Self {
            order_id: receipt.order_id.to_string(),
            total_cents: receipt.total_cents,
            created_at: receipt.created_at.to_rfc3339(),
        }
    }
}

impl From<&CheckoutOutcome> for CheckoutResponse {
    fn from(outcome: &CheckoutOutcome) -> Self {
        match outcome {
            CheckoutOutcome::Created(receipt) => Self {
                status: "created".to_string(),
                order: Some(receipt.into()),
            },
            CheckoutOutcome::AwaitingPayment => Self {
                status: "awaiting_payment".to_string(),
                order: None,
            },
        }
    }
}

/// Payment webhook acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentWebhookResponse {
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderSummary>,
}

impl From<&PaymentConfirmationResult> for PaymentWebhookResponse {
    fn from(result: &PaymentConfirmationResult) -> Self {
        match result {
            PaymentConfirmationResult::OrderCreated(receipt) => Self {
                result: "order_created".to_string(),
                order: Some(receipt.into()),
            },
            PaymentConfirmationResult::NothingStaged => Self {
                result: "nothing_staged".to_string(),
                order: None,
            },
            PaymentConfirmationResult::Ignored => Self {
                result: "ignored".to_string(),
                order: None,
            },
        }
    }
}

/// Liveness check body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub clients: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CustomerId, OrderId};
    use serde_json::json;

    #[test]
    fn checkout_request_reads_flat_form_fields() {
        let body = json!({
            "fullname": "Ada Baker",
            "email": "ada@example.com",
            "phone": "555-0100",
            "pickuptime": "2030-01-01T09:00:00Z",
            "method": "card"
        });

        let request: CheckoutRequest = serde_json::from_value(body).unwrap();

        assert_eq!(request.contact.fullname, "Ada Baker");
        assert!(request.contact.address.is_empty());
        assert_eq!(request.method, PaymentMethod::Card);
    }

    #[test]
    fn awaiting_payment_has_no_order() {
        let response = CheckoutResponse::from(&CheckoutOutcome::AwaitingPayment);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({ "status": "awaiting_payment" }));
    }

    #[test]
    fn created_order_is_summarised() {
        let receipt = OrderReceipt {
            order_id: OrderId::new(),
            customer_id: CustomerId::new(),
            total_cents: 1400,
            created_at: Timestamp::now(),
        };

        let response = PaymentWebhookResponse::from(&PaymentConfirmationResult::OrderCreated(
            receipt.clone(),
        ));

        assert_eq!(response.result, "order_created");
        let order = response.order.unwrap();
        assert_eq!(order.order_id, receipt.order_id.to_string());
        assert_eq!(order.total_cents, 1400);
    }
}

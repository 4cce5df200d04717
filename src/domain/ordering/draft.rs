//! Draft orders: validated checkout submissions awaiting payment.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{Timestamp, ValidationError};

/// How the shopper pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Paid at pickup; the order is created immediately.
    Cash,
    /// Paid online; the order waits for the provider's confirmation.
    Card,
}

impl PaymentMethod {
    /// Whether money moves out of band, so the order must be staged.
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, PaymentMethod::Card)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => f.write_str("cash"),
            PaymentMethod::Card => f.write_str("card"),
        }
    }
}

/// Who placed the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub fullname: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

impl ContactInfo {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.fullname.trim().is_empty() {
            return Err(ValidationError::empty_field("fullname"));
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        if !self.email.contains('@') {
            return Err(ValidationError::invalid_format("email", "missing @ symbol"));
        }
        if self.phone.trim().is_empty() {
            return Err(ValidationError::empty_field("phone"));
        }
        Ok(())
    }
}

/// One cart line, priced at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    pub unit_price_cents: u64,
    pub quantity: u32,
}

impl LineItem {
    pub fn subtotal_cents(&self) -> u64 {
        self.unit_price_cents * u64::from(self.quantity)
    }
}

/// A complete, validated order that has not been paid for yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftOrder {
    pub contact: ContactInfo,
    pub pickup_time: Timestamp,
    pub method: PaymentMethod,
    pub items: Vec<LineItem>,
}

impl DraftOrder {
    /// Checks the submission against the current time.
    pub fn validate(&self, now: &Timestamp) -> Result<(), ValidationError> {
        self.contact.validate()?;

        if !self.pickup_time.is_after(now) {
            return Err(ValidationError::invalid_format(
                "pickuptime",
                "pickup time must be in the future",
            ));
        }
        if self.items.is_empty() {
            return Err(ValidationError::empty_field("items"));
        }
        if self.items.iter().any(|item| item.quantity == 0) {
            return Err(ValidationError::invalid_format(
                "items",
                "every line needs a positive quantity",
            ));
        }
        Ok(())
    }

    pub fn total_cents(&self) -> u64 {
        self.items.iter().map(LineItem::subtotal_cents).sum()
    }
}

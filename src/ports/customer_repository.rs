//! CustomerRepository port - Customer records keyed by email.

use async_trait::async_trait;

use crate::domain::foundation::{CustomerId, DomainError};
use crate::domain::ordering::ContactInfo;

/// Result of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomerUpsert {
    pub customer_id: CustomerId,
    /// `true` when no customer with this email existed before.
    pub created: bool,
}

/// Port for customer persistence.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Create the customer, or update name/phone/address of the existing
    /// customer with the same email.
    async fn upsert(&self, contact: &ContactInfo) -> Result<CustomerUpsert, DomainError>;
}

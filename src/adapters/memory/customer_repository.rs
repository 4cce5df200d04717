//! In-Memory Customer Repository Adapter
//!
//! Customers are keyed by lower-cased email, matching how the storefront
//! recognises returning shoppers.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{CustomerId, DomainError};
use crate::domain::ordering::ContactInfo;
use crate::ports::{CustomerRepository, CustomerUpsert};

#[derive(Debug, Clone)]
struct StoredCustomer {
    id: CustomerId,
    contact: ContactInfo,
}

/// In-memory customer store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCustomerRepository {
    customers: Arc<RwLock<HashMap<String, StoredCustomer>>>,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.customers.read().await.len()
    }

    /// Look up a customer's contact details by email.
    pub async fn find_by_email(&self, email: &str) -> Option<ContactInfo> {
        self.customers
            .read()
            .await
            .get(&email.trim().to_lowercase())
            .map(|stored| stored.contact.clone())
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn upsert(&self, contact: &ContactInfo) -> Result<CustomerUpsert, DomainError> {
        let key = contact.email.trim().to_lowercase();
        let mut customers = self.customers.write().await;

        if let Some(existing) = customers.get_mut(&key) {
            existing.contact = contact.clone();
            return Ok(CustomerUpsert {
                customer_id: existing.id,
                created: false,
            });
        }

        let id = CustomerId::new();
        customers.insert(
            key,
            StoredCustomer {
                id,
                contact: contact.clone(),
            },
        );
        Ok(CustomerUpsert {
            customer_id: id,
            created: true,
        })
    }
}

//! In-Memory Cart Store Adapter
//!
//! Stands in for the session-backed cart of the storefront.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{CartSessionId, DomainError};
use crate::domain::ordering::LineItem;
use crate::ports::CartStore;

/// In-memory carts keyed by session.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartStore {
    carts: Arc<RwLock<HashMap<CartSessionId, Vec<LineItem>>>>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the session's cart.
    pub async fn put(&self, session_id: &CartSessionId, items: Vec<LineItem>) {
        self.carts.write().await.insert(session_id.clone(), items);
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn line_items(&self, session_id: &CartSessionId) -> Result<Vec<LineItem>, DomainError> {
        Ok(self
            .carts
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn clear(&self, session_id: &CartSessionId) -> Result<(), DomainError> {
        self.carts.write().await.remove(session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_session_has_empty_cart() {
        let store = InMemoryCartStore::new();
        let session = CartSessionId::new("nobody").unwrap();
        assert!(store.line_items(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_empties_the_cart() {
        let store = InMemoryCartStore::new();
        let session = CartSessionId::new("s1").unwrap();
        store
            .put(
                &session,
                vec![LineItem {
                    product_id: "rye".to_string(),
                    name: "Rye".to_string(),
                    unit_price_cents: 500,
                    quantity: 1,
                }],
            )
            .await;

        store.clear(&session).await.unwrap();

        assert!(store.line_items(&session).await.unwrap().is_empty());
    }
}

//! In-Memory Order Repository Adapter

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, OrderId};
use crate::ports::{NewOrder, OrderRepository};

/// In-memory order store with failure injection for tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<Vec<(OrderId, NewOrder)>>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `create` call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn count(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn get(&self, id: &OrderId) -> Option<NewOrder> {
        self.orders
            .read()
            .await
            .iter()
            .find(|(order_id, _)| order_id == id)
            .map(|(_, order)| order.clone())
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: &NewOrder) -> Result<OrderId, DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::database("order store unavailable"));
        }
        let id = OrderId::new();
        self.orders.write().await.push((id, order.clone()));
        Ok(id)
    }
}

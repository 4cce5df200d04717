//! OrderCreationPipeline - Turns a confirmed draft into a durable order.
//!
//! Steps, in order:
//! 1. Upsert the customer by email
//! 2. Persist the order and its lines
//! 3. Clear the session cart
//! 4. Send receipt / owner notification
//! 5. Tell admin dashboards that orders and customers changed
//!
//! Steps 1 and 2 decide the outcome: if either fails there is no order and
//! the staged draft must survive. Once the order exists, money has moved
//! and the order is real, so failures in steps 3 and 4 are logged only.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::foundation::{CartSessionId, Timestamp};
use crate::domain::ordering::{DraftOrder, OrderError};
use crate::domain::realtime::{Event, EventType};
use crate::ports::{
    CartStore, CustomerRepository, LiveUpdates, NewOrder, OrderNotifier, OrderPipeline,
    OrderReceipt, OrderRepository,
};

/// Default [`OrderPipeline`] composed from the CRUD ports.
pub struct OrderCreationPipeline {
    customers: Arc<dyn CustomerRepository>,
    orders: Arc<dyn OrderRepository>,
    carts: Arc<dyn CartStore>,
    notifier: Arc<dyn OrderNotifier>,
    live: Arc<dyn LiveUpdates>,
}

impl OrderCreationPipeline {
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        orders: Arc<dyn OrderRepository>,
        carts: Arc<dyn CartStore>,
        notifier: Arc<dyn OrderNotifier>,
        live: Arc<dyn LiveUpdates>,
    ) -> Self {
        Self {
            customers,
            orders,
            carts,
            notifier,
            live,
        }
    }
}

#[async_trait]
impl OrderPipeline for OrderCreationPipeline {
    async fn process(
        &self,
        session_id: &CartSessionId,
        draft: &DraftOrder,
    ) -> Result<OrderReceipt, OrderError> {
        // 1. Customer
        let customer = self
            .customers
            .upsert(&draft.contact)
            .await
            .map_err(OrderError::CustomerUpsert)?;

        // 2. Order
        let order_id = self
            .orders
            .create(&NewOrder {
                customer_id: customer.customer_id,
                pickup_time: draft.pickup_time,
                method: draft.method,
                items: draft.items.clone(),
            })
            .await
            .map_err(OrderError::OrderPersist)?;

        let receipt = OrderReceipt {
            order_id,
            customer_id: customer.customer_id,
            total_cents: draft.total_cents(),
            created_at: Timestamp::now(),
        };

        // 3. Cart
        if let Err(e) = self.carts.clear(session_id).await {
            tracing::warn!(session_id = %session_id, order_id = %order_id, error = %e, "Failed to clear cart after order");
        }

        // 4. Notification
        if let Err(e) = self.notifier.order_placed(&receipt, draft).await {
            tracing::error!(order_id = %order_id, error = %e, "Order notification failed");
        }

        // 5. Dashboards
        self.live.publish(Event::new(
            EventType::OrdersChanged,
            json!({ "id": order_id.to_string() }),
        ));
        self.live.publish(Event::new(
            EventType::CustomersChanged,
            json!({ "id": customer.customer_id.to_string(), "created": customer.created }),
        ));

        Ok(receipt)
    }
}

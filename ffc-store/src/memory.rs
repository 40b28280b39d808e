use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ffc_chat::{ConversationState, ConversationStore, Message, MessageStore};
use ffc_core::BoxError;
use ffc_order::repository::{OrderStats, OrderStore};
use ffc_order::{Order, OrderStatus};
use ffc_shared::OrderId;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory record store backing all three repository traits. The test
/// suites inject it in place of the Postgres repositories; state dies with
/// the process.
pub struct MemoryStore {
    orders: RwLock<Vec<Order>>,
    messages: RwLock<Vec<Message>>,
    states: RwLock<HashMap<String, ConversationState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(Vec::new()),
            messages: RwLock::new(Vec::new()),
            states: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Statuses that count toward revenue: the customer committed and the order
/// didn't die.
fn is_committed(status: OrderStatus) -> bool {
    matches!(
        status,
        OrderStatus::Confirmed | OrderStatus::InProgress | OrderStatus::Shipped
    )
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create_order(&self, order: &Order) -> Result<(), BoxError> {
        self.orders.write().await.push(order.clone());
        Ok(())
    }

    async fn get_order(&self, id: &OrderId) -> Result<Option<Order>, BoxError> {
        Ok(self
            .orders
            .read()
            .await
            .iter()
            .find(|o| &o.id == id)
            .cloned())
    }

    async fn update_order(&self, order: &Order) -> Result<(), BoxError> {
        let mut orders = self.orders.write().await;
        match orders.iter_mut().find(|o| o.id == order.id) {
            Some(slot) => {
                *slot = order.clone();
                Ok(())
            }
            None => Err(format!("order {} not found", order.id).into()),
        }
    }

    async fn update_order_status(&self, id: &OrderId, status: OrderStatus) -> Result<(), BoxError> {
        let mut orders = self.orders.write().await;
        match orders.iter_mut().find(|o| &o.id == id) {
            Some(order) => {
                order.update_status(status);
                Ok(())
            }
            None => Err(format!("order {} not found", id).into()),
        }
    }

    async fn active_order_for_customer(
        &self,
        customer_id: &str,
    ) -> Result<Option<Order>, BoxError> {
        // Insertion order is creation order, so the last match is the most
        // recently created.
        Ok(self
            .orders
            .read()
            .await
            .iter()
            .filter(|o| o.customer_id == customer_id && !o.is_cancelled())
            .last()
            .cloned())
    }

    async fn list_recent_orders(&self, limit: usize) -> Result<Vec<Order>, BoxError> {
        Ok(self
            .orders
            .read()
            .await
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn order_stats(&self, since: DateTime<Utc>) -> Result<OrderStats, BoxError> {
        let orders = self.orders.read().await;
        let mut stats = OrderStats::default();

        for order in orders.iter().filter(|o| o.created_at >= since) {
            stats.total += 1;
            *stats
                .by_status
                .entry(order.status.as_str().to_string())
                .or_insert(0) += 1;

            if is_committed(order.status) {
                if let Some(price) = order.price {
                    stats.revenue_cents += price.total_cents as i64;
                }
                if let Some(margin) = order.margin_cents {
                    stats.margin_cents += margin as i64;
                }
            }
        }

        Ok(stats)
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn append_message(&self, message: &Message) -> Result<(), BoxError> {
        self.messages.write().await.push(message.clone());
        Ok(())
    }

    async fn list_messages(&self, customer_id: &str) -> Result<Vec<Message>, BoxError> {
        Ok(self
            .messages
            .read()
            .await
            .iter()
            .filter(|m| m.customer_id == customer_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn get_state(&self, customer_id: &str) -> Result<Option<ConversationState>, BoxError> {
        Ok(self.states.read().await.get(customer_id).cloned())
    }

    async fn set_state(&self, state: &ConversationState) -> Result<(), BoxError> {
        self.states
            .write()
            .await
            .insert(state.customer_id.clone(), state.clone());
        Ok(())
    }
}

use crate::models::{Order, OrderStatus};
use crate::repository::OrderStore;
use ffc_shared::OrderId;
use std::sync::Arc;

/// Operator-facing order administration. The one rule it enforces: a status
/// arriving from outside the process must parse into the closed vocabulary,
/// otherwise the write is rejected. The pipeline bypasses this gate for its
/// internal `in-progress`/`error` transitions.
pub struct OrderAdmin {
    orders: Arc<dyn OrderStore>,
}

impl OrderAdmin {
    pub fn new(orders: Arc<dyn OrderStore>) -> Self {
        Self { orders }
    }

    /// Apply an operator-requested status change.
    pub async fn set_status(&self, id: &OrderId, requested: &str) -> Result<Order, OrderError> {
        let mut order = self
            .orders
            .get_order(id)
            .await
            .map_err(|e| OrderError::StoreFailed(e.to_string()))?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))?;

        let status = OrderStatus::parse(requested).ok_or_else(|| {
            OrderError::InvalidStatusTransition {
                from: order.status.as_str().to_string(),
                to: requested.to_string(),
            }
        })?;

        self.orders
            .update_order_status(id, status)
            .await
            .map_err(|e| OrderError::StoreFailed(e.to_string()))?;

        order.update_status(status);
        Ok(order)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Order store failed: {0}")]
    StoreFailed(String),
}

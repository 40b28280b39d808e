use crate::models::{Order, OrderStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ffc_core::BoxError;
use ffc_shared::OrderId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Aggregate numbers for the dashboard, over a trailing window.
/// Revenue counts quoted totals on orders the customer committed to
/// (confirmed, in-progress, shipped); margin sums whatever the pipeline has
/// computed so far.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderStats {
    pub total: i64,
    pub by_status: HashMap<String, i64>,
    pub revenue_cents: i64,
    pub margin_cents: i64,
}

/// Repository trait for order data access
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create_order(&self, order: &Order) -> Result<(), BoxError>;

    async fn get_order(&self, id: &OrderId) -> Result<Option<Order>, BoxError>;

    /// Persist the full current state of an order (field-level updates are
    /// not worth the surface at this volume).
    async fn update_order(&self, order: &Order) -> Result<(), BoxError>;

    async fn update_order_status(&self, id: &OrderId, status: OrderStatus)
        -> Result<(), BoxError>;

    /// "The current order" for a customer: most recently created among the
    /// customer's non-cancelled orders.
    async fn active_order_for_customer(&self, customer_id: &str)
        -> Result<Option<Order>, BoxError>;

    /// Newest orders across all customers, for the dashboard list.
    async fn list_recent_orders(&self, limit: usize) -> Result<Vec<Order>, BoxError>;

    async fn order_stats(&self, since: DateTime<Utc>) -> Result<OrderStats, BoxError>;
}

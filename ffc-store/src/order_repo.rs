use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ffc_catalog::{FulfillmentMode, Material, PriceBreakdown, SizeClass};
use ffc_core::BoxError;
use ffc_order::repository::{OrderStats, OrderStore};
use ffc_order::{Order, OrderStatus};
use ffc_shared::OrderId;
use sqlx::PgPool;

pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: String,
    customer_id: String,
    customer_name: Option<String>,
    status: String,
    photo_path: Option<String>,
    material: Option<String>,
    color: Option<String>,
    size: Option<String>,
    fulfillment: Option<String>,
    rush: bool,
    cad_design: bool,
    base_cents: Option<i32>,
    addons_cents: Option<i32>,
    shipping_cents: Option<i32>,
    total_cents: Option<i32>,
    vendor_cost_cents: Option<i32>,
    margin_cents: Option<i32>,
    model_path: Option<String>,
    vendor_quote_id: Option<String>,
    vendor_order_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const ORDER_COLUMNS: &str = "id, customer_id, customer_name, status, photo_path, material, color, size, fulfillment, rush, cad_design, base_cents, addons_cents, shipping_cents, total_cents, vendor_cost_cents, margin_cents, model_path, vendor_quote_id, vendor_order_id, created_at, updated_at";

impl OrderRow {
    fn into_order(self) -> Order {
        let status = OrderStatus::parse(&self.status).unwrap_or_else(|| {
            tracing::warn!("Order {} has unknown status {:?}", self.id, self.status);
            OrderStatus::Error
        });

        let price = match (
            self.base_cents,
            self.addons_cents,
            self.shipping_cents,
            self.total_cents,
        ) {
            (Some(base_cents), Some(addons_cents), Some(shipping_cents), Some(total_cents)) => {
                Some(PriceBreakdown {
                    base_cents,
                    addons_cents,
                    shipping_cents,
                    total_cents,
                })
            }
            _ => None,
        };

        Order {
            id: OrderId::new(self.id),
            customer_id: self.customer_id,
            customer_name: self.customer_name,
            status,
            photo_path: self.photo_path,
            material: self.material.as_deref().and_then(Material::parse),
            color: self.color,
            size: self.size.as_deref().and_then(SizeClass::parse),
            fulfillment: self.fulfillment.as_deref().and_then(FulfillmentMode::parse),
            rush: self.rush,
            cad_design: self.cad_design,
            price,
            vendor_cost_cents: self.vendor_cost_cents,
            margin_cents: self.margin_cents,
            model_path: self.model_path,
            vendor_quote_id: self.vendor_quote_id,
            vendor_order_id: self.vendor_order_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create_order(&self, order: &Order) -> Result<(), BoxError> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_id, customer_name, status, photo_path, material, color, size, fulfillment, rush, cad_design, base_cents, addons_cents, shipping_cents, total_cents, vendor_cost_cents, margin_cents, model_path, vendor_quote_id, vendor_order_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22)
            "#,
        )
        .bind(order.id.as_str())
        .bind(&order.customer_id)
        .bind(&order.customer_name)
        .bind(order.status.as_str())
        .bind(&order.photo_path)
        .bind(order.material.map(|m| m.as_str()))
        .bind(&order.color)
        .bind(order.size.map(|s| s.as_str()))
        .bind(order.fulfillment.map(|f| f.as_str()))
        .bind(order.rush)
        .bind(order.cad_design)
        .bind(order.price.map(|p| p.base_cents))
        .bind(order.price.map(|p| p.addons_cents))
        .bind(order.price.map(|p| p.shipping_cents))
        .bind(order.price.map(|p| p.total_cents))
        .bind(order.vendor_cost_cents)
        .bind(order.margin_cents)
        .bind(&order.model_path)
        .bind(&order.vendor_quote_id)
        .bind(&order.vendor_order_id)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_order(&self, id: &OrderId) -> Result<Option<Order>, BoxError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {} FROM orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(OrderRow::into_order))
    }

    async fn update_order(&self, order: &Order) -> Result<(), BoxError> {
        sqlx::query(
            r#"
            UPDATE orders
            SET customer_name = $2, status = $3, photo_path = $4, material = $5, color = $6, size = $7, fulfillment = $8, rush = $9, cad_design = $10, base_cents = $11, addons_cents = $12, shipping_cents = $13, total_cents = $14, vendor_cost_cents = $15, margin_cents = $16, model_path = $17, vendor_quote_id = $18, vendor_order_id = $19, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(order.id.as_str())
        .bind(&order.customer_name)
        .bind(order.status.as_str())
        .bind(&order.photo_path)
        .bind(order.material.map(|m| m.as_str()))
        .bind(&order.color)
        .bind(order.size.map(|s| s.as_str()))
        .bind(order.fulfillment.map(|f| f.as_str()))
        .bind(order.rush)
        .bind(order.cad_design)
        .bind(order.price.map(|p| p.base_cents))
        .bind(order.price.map(|p| p.addons_cents))
        .bind(order.price.map(|p| p.shipping_cents))
        .bind(order.price.map(|p| p.total_cents))
        .bind(order.vendor_cost_cents)
        .bind(order.margin_cents)
        .bind(&order.model_path)
        .bind(&order.vendor_quote_id)
        .bind(&order.vendor_order_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_order_status(&self, id: &OrderId, status: OrderStatus) -> Result<(), BoxError> {
        sqlx::query("UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn active_order_for_customer(
        &self,
        customer_id: &str,
    ) -> Result<Option<Order>, BoxError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {} FROM orders WHERE customer_id = $1 AND status <> 'cancelled' ORDER BY created_at DESC LIMIT 1",
            ORDER_COLUMNS
        ))
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(OrderRow::into_order))
    }

    async fn list_recent_orders(&self, limit: usize) -> Result<Vec<Order>, BoxError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {} FROM orders ORDER BY created_at DESC LIMIT $1",
            ORDER_COLUMNS
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderRow::into_order).collect())
    }

    async fn order_stats(&self, since: DateTime<Utc>) -> Result<OrderStats, BoxError> {
        let counts: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM orders WHERE created_at >= $1 GROUP BY status",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        let (revenue, margin): (Option<i64>, Option<i64>) = sqlx::query_as(
            r#"
            SELECT SUM(total_cents)::BIGINT, SUM(margin_cents)::BIGINT
            FROM orders
            WHERE created_at >= $1 AND status IN ('confirmed', 'in-progress', 'shipped')
            "#,
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        let mut stats = OrderStats {
            revenue_cents: revenue.unwrap_or(0),
            margin_cents: margin.unwrap_or(0),
            ..OrderStats::default()
        };
        for (status, count) in counts {
            stats.total += count;
            stats.by_status.insert(status, count);
        }

        Ok(stats)
    }
}

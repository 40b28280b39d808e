use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Duration, Utc};
use ffc_chat::Message;
use ffc_core::VendorOrderStatus;
use ffc_order::{Order, OrderError, OrderStatus, PipelineReport};
use ffc_order::repository::OrderStats;
use ffc_shared::{Masked, OrderId};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: String,
    /// Serializes as the real chat id; `Debug` output stays masked
    pub customer_id: Masked<String>,
    pub customer_name: Option<String>,
    pub status: String,
    pub photo_path: Option<String>,
    pub material: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub fulfillment: Option<String>,
    pub rush: bool,
    pub cad_design: bool,
    pub base_cents: Option<i32>,
    pub addons_cents: Option<i32>,
    pub shipping_cents: Option<i32>,
    pub total_cents: Option<i32>,
    pub vendor_cost_cents: Option<i32>,
    pub margin_cents: Option<i32>,
    pub model_path: Option<String>,
    pub vendor_quote_id: Option<String>,
    pub vendor_order_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.as_str().to_string(),
            customer_id: Masked(order.customer_id),
            customer_name: order.customer_name,
            status: order.status.as_str().to_string(),
            photo_path: order.photo_path,
            material: order.material.map(|m| m.as_str().to_string()),
            color: order.color,
            size: order.size.map(|s| s.as_str().to_string()),
            fulfillment: order.fulfillment.map(|f| f.as_str().to_string()),
            rush: order.rush,
            cad_design: order.cad_design,
            base_cents: order.price.map(|p| p.base_cents),
            addons_cents: order.price.map(|p| p.addons_cents),
            shipping_cents: order.price.map(|p| p.shipping_cents),
            total_cents: order.price.map(|p| p.total_cents),
            vendor_cost_cents: order.vendor_cost_cents,
            margin_cents: order.margin_cents,
            model_path: order.model_path,
            vendor_quote_id: order.vendor_quote_id,
            vendor_order_id: order.vendor_order_id,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    /// Trailing window in days, defaults to 30
    pub days: Option<i64>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /v1/admin/orders
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<OrderResponse>>, StatusCode> {
    let orders = state
        .orders
        .list_recent_orders(query.limit.unwrap_or(50))
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// GET /v1/admin/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderResponse>, StatusCode> {
    let order = state
        .orders
        .get_order(&OrderId::new(order_id))
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(order.into()))
}

/// PUT /v1/admin/orders/{id}/status
/// Operator status change, gated on the closed status vocabulary
pub async fn set_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state
        .admin
        .set_status(&OrderId::new(order_id), &req.status)
        .await
        .map_err(|err| match err {
            OrderError::NotFound(id) => AppError::NotFoundError(format!("Order {} not found", id)),
            OrderError::InvalidStatusTransition { .. } => AppError::ValidationError(err.to_string()),
            OrderError::StoreFailed(msg) => AppError::InternalServerError(msg),
        })?;

    Ok(Json(order.into()))
}

/// POST /v1/admin/orders/{id}/fulfill
/// Run the fulfillment pipeline and hand back the report
pub async fn run_fulfillment(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Json<PipelineReport> {
    let report = state.pipeline.run(&OrderId::new(order_id)).await;
    Json(report)
}

/// GET /v1/admin/orders/{id}/vendor-status
/// Proxy the vendor's status for a placed order, promoting it to `shipped`
/// once the vendor says so
pub async fn vendor_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<VendorOrderStatus>, StatusCode> {
    let order_id = OrderId::new(order_id);
    let order = state
        .orders
        .get_order(&order_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let vendor_order_id = order.vendor_order_id.ok_or(StatusCode::BAD_REQUEST)?;

    let status = state
        .vendor
        .order_status(&vendor_order_id)
        .await
        .map_err(|err| {
            tracing::error!("Vendor status lookup failed for {}: {}", vendor_order_id, err);
            StatusCode::BAD_GATEWAY
        })?;

    if matches!(status.status.as_str(), "shipped" | "delivered")
        && order.status != OrderStatus::Shipped
    {
        if let Err(err) = state
            .orders
            .update_order_status(&order_id, OrderStatus::Shipped)
            .await
        {
            tracing::warn!("Could not mark order {} shipped: {}", order_id, err);
        }
    }

    Ok(Json(status))
}

/// GET /v1/admin/stats
pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<OrderStats>, StatusCode> {
    let since = Utc::now() - Duration::days(query.days.unwrap_or(30));
    let stats = state
        .orders
        .order_stats(since)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(stats))
}

/// GET /v1/admin/customers/{id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Result<Json<Vec<Message>>, StatusCode> {
    let messages = state
        .messages
        .list_messages(&customer_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(messages))
}

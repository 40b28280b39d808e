use chrono::{DateTime, Utc};
use ffc_catalog::{FulfillmentMode, Material, PriceBreakdown, SizeClass};
use ffc_shared::OrderId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status in the lifecycle. The chat engine sets `New`/`Confirmed`/
/// `Cancelled`; the pipeline sets `InProgress`/`Error`; `Shipped` arrives
/// from vendor status or an operator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    New,
    Confirmed,
    InProgress,
    Shipped,
    Cancelled,
    Error,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::InProgress => "in-progress",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Error => "error",
        }
    }

    /// Parse an externally supplied status string. Anything outside the
    /// closed vocabulary is rejected by the caller.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "new" => Some(OrderStatus::New),
            "confirmed" => Some(OrderStatus::Confirmed),
            "in-progress" => Some(OrderStatus::InProgress),
            "shipped" => Some(OrderStatus::Shipped),
            "cancelled" => Some(OrderStatus::Cancelled),
            "error" => Some(OrderStatus::Error),
            _ => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The single source of truth for one customer job, from first photo to
/// delivered organizer. Never deleted, only status-transitioned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: String,
    pub customer_name: Option<String>,
    pub status: OrderStatus,

    /// Local path of the drawer photo the customer sent
    pub photo_path: Option<String>,
    pub material: Option<Material>,
    pub color: Option<String>,
    pub size: Option<SizeClass>,
    pub fulfillment: Option<FulfillmentMode>,
    pub rush: bool,
    pub cad_design: bool,

    /// Quote presented to the customer, set once the chat reaches QuoteSent
    pub price: Option<PriceBreakdown>,
    /// What the cloud vendor charges us, set by the pipeline
    pub vendor_cost_cents: Option<i32>,
    pub margin_cents: Option<i32>,

    /// Generated 3D model artifact, set by the pipeline
    pub model_path: Option<String>,
    pub vendor_quote_id: Option<String>,
    pub vendor_order_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(customer_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::generate(),
            customer_id,
            customer_name: None,
            status: OrderStatus::New,
            photo_path: None,
            material: None,
            color: None,
            size: None,
            fulfillment: None,
            rush: false,
            cad_design: false,
            price: None,
            vendor_cost_cents: None,
            margin_cents: None,
            model_path: None,
            vendor_quote_id: None,
            vendor_order_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update_status(&mut self, new_status: OrderStatus) {
        self.status = new_status;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == OrderStatus::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_order_defaults() {
        let order = Order::new("15551230001".to_string());
        assert_eq!(order.status, OrderStatus::New);
        assert!(order.id.as_str().starts_with("FFC-"));
        assert!(order.photo_path.is_none());
        assert!(!order.rush);
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        assert_eq!(OrderStatus::parse("Shipped"), Some(OrderStatus::Shipped));
        assert_eq!(OrderStatus::parse("IN-PROGRESS"), Some(OrderStatus::InProgress));
        assert_eq!(OrderStatus::parse("refunded"), None);
    }

    #[test]
    fn test_status_wire_spelling() {
        assert_eq!(serde_json::to_string(&OrderStatus::InProgress).unwrap(), "\"in-progress\"");
    }
}

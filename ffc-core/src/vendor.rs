use crate::BoxError;
use async_trait::async_trait;
use ffc_catalog::Material;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// One vendor offer for printing a model. `total_price_cents` already
/// includes the vendor's shipping for the attached `shipping_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VendorQuote {
    pub quote_id: String,
    pub vendor_id: String,
    pub total_price_cents: i32,
    pub lead_days: u32,
    pub shipping_id: String,
}

/// Quote response: all offers the vendor returned, plus the pick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSet {
    pub best: Option<VendorQuote>,
    pub all: Vec<VendorQuote>,
}

impl QuoteSet {
    /// Select the globally cheapest total price among the returned quotes,
    /// regardless of their order on the wire.
    pub fn from_quotes(all: Vec<VendorQuote>) -> Self {
        let best = all
            .iter()
            .min_by_key(|q| q.total_price_cents)
            .cloned();
        Self { best, all }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub line1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl ShippingAddress {
    /// Auto-ordering ships everything to the shop for inspection before the
    /// customer hand-off, so the address is fixed and only the attention
    /// line varies with the customer's stored name.
    pub fn shop_placeholder(customer_name: &str) -> Self {
        Self {
            name: format!("FormFit Customs c/o {}", customer_name),
            line1: "412 Mercer Mill Rd, Unit B".to_string(),
            city: "Lancaster".to_string(),
            state: "PA".to_string(),
            postal_code: "17601".to_string(),
            country: "US".to_string(),
        }
    }
}

/// Acknowledgement of a placed vendor order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorOrder {
    pub order_id: String,
    pub tracking: Option<String>,
    pub estimated_delivery: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorOrderStatus {
    pub status: String,
    pub tracking: Option<String>,
    pub estimated_delivery: Option<String>,
}

/// The cloud print vendor's quoting/ordering API
#[async_trait]
pub trait PrintVendorClient: Send + Sync {
    /// Quote printing `quantity` copies of the model in the given material.
    async fn quote(
        &self,
        model_path: &str,
        material: Material,
        quantity: u32,
    ) -> Result<QuoteSet, BoxError>;

    /// Place an order against a previously returned quote.
    async fn place_order(
        &self,
        quote_id: &str,
        address: &ShippingAddress,
        customer_ref: &str,
        shipping_id: &str,
    ) -> Result<VendorOrder, BoxError>;

    /// Current status of a placed vendor order.
    async fn order_status(&self, vendor_order_id: &str) -> Result<VendorOrderStatus, BoxError>;
}

/// Canned vendor for tests: returns a configured quote list, records
/// placements, and can simulate ordering failures.
pub struct MockPrintVendor {
    quotes: Mutex<Vec<VendorQuote>>,
    placed: Mutex<Vec<String>>,
    fail_place: AtomicBool,
    status: Mutex<VendorOrderStatus>,
}

impl MockPrintVendor {
    pub fn with_quotes(quotes: Vec<VendorQuote>) -> Self {
        Self {
            quotes: Mutex::new(quotes),
            placed: Mutex::new(Vec::new()),
            fail_place: AtomicBool::new(false),
            status: Mutex::new(VendorOrderStatus {
                status: "processing".to_string(),
                tracking: None,
                estimated_delivery: None,
            }),
        }
    }

    pub fn empty() -> Self {
        Self::with_quotes(Vec::new())
    }

    pub fn fail_place(&self, fail: bool) {
        self.fail_place.store(fail, Ordering::SeqCst);
    }

    pub fn set_status(&self, status: VendorOrderStatus) {
        *self.status.lock().unwrap() = status;
    }

    /// Quote ids ordered through `place_order` so far.
    pub fn placed_quote_ids(&self) -> Vec<String> {
        self.placed.lock().unwrap().clone()
    }
}

#[async_trait]
impl PrintVendorClient for MockPrintVendor {
    async fn quote(
        &self,
        _model_path: &str,
        _material: Material,
        _quantity: u32,
    ) -> Result<QuoteSet, BoxError> {
        Ok(QuoteSet::from_quotes(self.quotes.lock().unwrap().clone()))
    }

    async fn place_order(
        &self,
        quote_id: &str,
        _address: &ShippingAddress,
        _customer_ref: &str,
        _shipping_id: &str,
    ) -> Result<VendorOrder, BoxError> {
        if self.fail_place.load(Ordering::SeqCst) {
            return Err("vendor rejected the order".into());
        }
        self.placed.lock().unwrap().push(quote_id.to_string());
        Ok(VendorOrder {
            order_id: format!("VND-{}", quote_id),
            tracking: None,
            estimated_delivery: Some("7 business days".to_string()),
        })
    }

    async fn order_status(&self, _vendor_order_id: &str) -> Result<VendorOrderStatus, BoxError> {
        Ok(self.status.lock().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(id: &str, cents: i32) -> VendorQuote {
        VendorQuote {
            quote_id: id.to_string(),
            vendor_id: format!("vendor-{}", id),
            total_price_cents: cents,
            lead_days: 5,
            shipping_id: "ship-std".to_string(),
        }
    }

    #[test]
    fn test_cheapest_quote_wins_regardless_of_order() {
        let set = QuoteSet::from_quotes(vec![quote("a", 4000), quote("b", 2500), quote("c", 6000)]);
        assert_eq!(set.best.as_ref().unwrap().quote_id, "b");
        assert_eq!(set.best.as_ref().unwrap().total_price_cents, 2500);

        let reversed = QuoteSet::from_quotes(vec![quote("c", 6000), quote("b", 2500), quote("a", 4000)]);
        assert_eq!(reversed.best.unwrap().quote_id, "b");
    }

    #[test]
    fn test_empty_quote_list_has_no_best() {
        let set = QuoteSet::from_quotes(Vec::new());
        assert!(set.best.is_none());
    }
}

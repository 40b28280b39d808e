use crate::models::{Order, OrderStatus};
use crate::repository::OrderStore;
use ffc_catalog::{FulfillmentMode, Material};
use ffc_core::vendor::VendorQuote;
use ffc_core::{ModelGenerator, PrintVendorClient, ShippingAddress};
use ffc_shared::OrderId;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Knobs for one pipeline instance. The generation retry is a fixed-delay
/// policy local to the automation step; the vendor client carries its own
/// polling loop and gets no retry here.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub generation_attempts: u32,
    pub generation_retry_delay: Duration,
    /// Directory generated model files are written into
    pub model_output_dir: String,
    /// Auto-place vendor orders after quoting. Off when no ordering
    /// credential is configured.
    pub auto_order: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            generation_attempts: 2,
            generation_retry_delay: Duration::from_secs(3),
            model_output_dir: "./models".to_string(),
            auto_order: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("NotFound: order {0} does not exist")]
    NotFound(OrderId),

    #[error("MissingPhoto: order {0} has no photo to generate a model from")]
    MissingPhoto(OrderId),

    #[error("ModelGenerationFailed: {0}")]
    ModelGenerationFailed(String),

    #[error("NoQuoteAvailable: {0}")]
    NoQuoteAvailable(String),

    #[error("StoreFailed: {0}")]
    StoreFailed(String),
}

/// What a pipeline run produced. Failures land in `error`, never in a Rust
/// `Err` — the caller always gets a report it can show an operator.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub success: bool,
    pub order_id: OrderId,
    pub model_path: Option<String>,
    pub vendor_quote: Option<VendorQuote>,
    pub error: Option<String>,
}

impl PipelineReport {
    fn failure(order_id: OrderId, error: String) -> Self {
        Self {
            success: false,
            order_id,
            model_path: None,
            vendor_quote: None,
            error: Some(error),
        }
    }
}

/// Drives a confirmed order from "has photo" to "ready for fulfillment or
/// placed with the vendor". Intermediate artifacts (model path, quote id)
/// are persisted the moment they exist, so a re-run after a transient
/// failure skips completed steps instead of re-charging the automation.
pub struct OrderPipeline {
    orders: Arc<dyn OrderStore>,
    generator: Arc<dyn ModelGenerator>,
    vendor: Arc<dyn PrintVendorClient>,
    config: PipelineConfig,
}

impl OrderPipeline {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        generator: Arc<dyn ModelGenerator>,
        vendor: Arc<dyn PrintVendorClient>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            orders,
            generator,
            vendor,
            config,
        }
    }

    pub async fn run(&self, order_id: &OrderId) -> PipelineReport {
        match self.run_inner(order_id).await {
            Ok(report) => report,
            Err(err) => {
                tracing::error!("Pipeline failed for order {}: {}", order_id, err);
                // Record the failure on the order; losing this write only
                // costs the operator the status hint, the report still
                // carries the message.
                if let Err(persist_err) = self
                    .orders
                    .update_order_status(order_id, OrderStatus::Error)
                    .await
                {
                    tracing::warn!(
                        "Could not persist error status for order {}: {}",
                        order_id,
                        persist_err
                    );
                }
                PipelineReport::failure(order_id.clone(), err.to_string())
            }
        }
    }

    async fn run_inner(&self, order_id: &OrderId) -> Result<PipelineReport, PipelineError> {
        let mut order = self
            .orders
            .get_order(order_id)
            .await
            .map_err(|e| PipelineError::StoreFailed(e.to_string()))?
            .ok_or_else(|| PipelineError::NotFound(order_id.clone()))?;

        let model_path = match order.model_path.clone() {
            // A previous run already produced the model; never regenerate.
            Some(path) => path,
            None => {
                let photo = order
                    .photo_path
                    .clone()
                    .ok_or_else(|| PipelineError::MissingPhoto(order_id.clone()))?;

                let model_path = self.generate_with_retry(&photo).await?;

                order.model_path = Some(model_path.clone());
                order.touch();
                self.orders
                    .update_order(&order)
                    .await
                    .map_err(|e| PipelineError::StoreFailed(e.to_string()))?;
                tracing::info!("Order {}: model generated at {}", order_id, model_path);
                model_path
            }
        };

        match order.fulfillment.unwrap_or(FulfillmentMode::SelfPrint) {
            FulfillmentMode::SelfPrint => {
                self.orders
                    .update_order_status(order_id, OrderStatus::InProgress)
                    .await
                    .map_err(|e| PipelineError::StoreFailed(e.to_string()))?;

                Ok(PipelineReport {
                    success: true,
                    order_id: order_id.clone(),
                    model_path: Some(model_path),
                    vendor_quote: None,
                    error: None,
                })
            }
            FulfillmentMode::Cloud => self.fulfill_via_vendor(order, model_path).await,
        }
    }

    async fn fulfill_via_vendor(
        &self,
        mut order: Order,
        model_path: String,
    ) -> Result<PipelineReport, PipelineError> {
        let material = order.material.unwrap_or(Material::Pla);

        let quotes = self
            .vendor
            .quote(&model_path, material, 1)
            .await
            .map_err(|e| PipelineError::NoQuoteAvailable(e.to_string()))?;

        let best = quotes.best.ok_or_else(|| {
            PipelineError::NoQuoteAvailable("vendor returned zero usable quotes".to_string())
        })?;

        order.vendor_cost_cents = Some(best.total_price_cents);
        order.vendor_quote_id = Some(best.quote_id.clone());
        order.margin_cents = order.price.map(|p| p.total_cents - best.total_price_cents);
        order.touch();
        self.orders
            .update_order(&order)
            .await
            .map_err(|e| PipelineError::StoreFailed(e.to_string()))?;
        tracing::info!(
            "Order {}: best vendor quote {} at {} cents ({} day lead)",
            order.id,
            best.quote_id,
            best.total_price_cents,
            best.lead_days
        );

        if self.config.auto_order {
            let attention = order.customer_name.as_deref().unwrap_or("walk-in customer");
            let address = ShippingAddress::shop_placeholder(attention);

            match self
                .vendor
                .place_order(&best.quote_id, &address, order.id.as_str(), &best.shipping_id)
                .await
            {
                Ok(vendor_order) => {
                    order.vendor_order_id = Some(vendor_order.order_id.clone());
                    order.update_status(OrderStatus::InProgress);
                    self.orders
                        .update_order(&order)
                        .await
                        .map_err(|e| PipelineError::StoreFailed(e.to_string()))?;
                    tracing::info!(
                        "Order {}: vendor order {} placed",
                        order.id,
                        vendor_order.order_id
                    );
                }
                Err(err) => {
                    // Placement failure is not a pipeline failure: the quote
                    // is saved and the operator can place it manually.
                    tracing::warn!(
                        "Order {}: vendor order placement failed ({}), quote {} kept for manual placement",
                        order.id,
                        err,
                        best.quote_id
                    );
                }
            }
        }

        Ok(PipelineReport {
            success: true,
            order_id: order.id.clone(),
            model_path: Some(model_path),
            vendor_quote: Some(best),
            error: None,
        })
    }

    async fn generate_with_retry(&self, photo_path: &str) -> Result<String, PipelineError> {
        let attempts = self.config.generation_attempts.max(1);
        let mut last_err = String::new();

        for attempt in 1..=attempts {
            match self
                .generator
                .generate(photo_path, &self.config.model_output_dir)
                .await
            {
                Ok(model) => return Ok(model.model_path),
                Err(err) => {
                    tracing::warn!(
                        "Model generation attempt {}/{} failed: {}",
                        attempt,
                        attempts,
                        err
                    );
                    last_err = err.to_string();
                    if attempt < attempts {
                        sleep(self.config.generation_retry_delay).await;
                    }
                }
            }
        }

        Err(PipelineError::ModelGenerationFailed(last_err))
    }
}

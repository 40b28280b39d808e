use crate::app_config::VendorConfig;
use async_trait::async_trait;
use ffc_catalog::Material;
use ffc_core::{
    BoxError, PrintVendorClient, QuoteSet, ShippingAddress, VendorOrder, VendorOrderStatus,
    VendorQuote,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

/// Client for the cloud print vendor. Quoting is asynchronous on the vendor
/// side: submitting a model returns a job id which is then polled on a
/// fixed interval until the quotes are ready. That polling loop lives here,
/// not in the pipeline — it guards server-side processing delay, not
/// transport flakiness.
pub struct HttpPrintVendor {
    config: VendorConfig,
    client: reqwest::Client,
}

impl HttpPrintVendor {
    pub fn new(config: VendorConfig) -> Result<Self, BoxError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { config, client })
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }
}

#[derive(Serialize)]
struct QuoteRequest<'a> {
    model_path: &'a str,
    material: &'a str,
    quantity: u32,
}

#[derive(Deserialize)]
struct QuoteJobResponse {
    job_id: String,
}

#[derive(Deserialize)]
struct QuoteJobStatus {
    status: String,
    #[serde(default)]
    quotes: Vec<VendorQuote>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Serialize)]
struct PlaceOrderRequest<'a> {
    quote_id: &'a str,
    shipping_address: &'a ShippingAddress,
    customer_ref: &'a str,
    shipping_id: &'a str,
}

#[async_trait]
impl PrintVendorClient for HttpPrintVendor {
    async fn quote(
        &self,
        model_path: &str,
        material: Material,
        quantity: u32,
    ) -> Result<QuoteSet, BoxError> {
        let job: QuoteJobResponse = self
            .request(self.client.post(format!("{}/v1/quotes", self.config.base_url)))
            .json(&QuoteRequest {
                model_path,
                material: material.vendor_code(),
                quantity,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        for _ in 0..self.config.poll_attempts {
            let status: QuoteJobStatus = self
                .request(self.client.get(format!(
                    "{}/v1/quotes/{}",
                    self.config.base_url, job.job_id
                )))
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            match status.status.as_str() {
                "complete" => return Ok(QuoteSet::from_quotes(status.quotes)),
                "failed" => {
                    return Err(status
                        .error
                        .unwrap_or_else(|| "vendor quote job failed".to_string())
                        .into())
                }
                _ => sleep(Duration::from_secs(self.config.poll_interval_seconds)).await,
            }
        }

        Err(format!(
            "vendor quote job {} still pending after {} polls",
            job.job_id, self.config.poll_attempts
        )
        .into())
    }

    async fn place_order(
        &self,
        quote_id: &str,
        address: &ShippingAddress,
        customer_ref: &str,
        shipping_id: &str,
    ) -> Result<VendorOrder, BoxError> {
        let order: VendorOrder = self
            .request(self.client.post(format!("{}/v1/orders", self.config.base_url)))
            .json(&PlaceOrderRequest {
                quote_id,
                shipping_address: address,
                customer_ref,
                shipping_id,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(order)
    }

    async fn order_status(&self, vendor_order_id: &str) -> Result<VendorOrderStatus, BoxError> {
        let status: VendorOrderStatus = self
            .request(self.client.get(format!(
                "{}/v1/orders/{}",
                self.config.base_url, vendor_order_id
            )))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(status)
    }
}

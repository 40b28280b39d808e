use crate::app_config::GatewayConfig;
use async_trait::async_trait;
use ffc_core::{BoxError, ChatGateway};
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// Chat gateway over its HTTP API: bearer-token JSON sends, attachment
/// downloads saved under a per-customer media directory.
pub struct HttpChatGateway {
    config: GatewayConfig,
    client: reqwest::Client,
}

impl HttpChatGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, BoxError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { config, client })
    }
}

#[derive(serde::Serialize)]
struct SendTextRequest<'a> {
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    text: &'a str,
}

#[async_trait]
impl ChatGateway for HttpChatGateway {
    async fn send_text(&self, customer_id: &str, text: &str) -> Result<(), BoxError> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.base_url))
            .bearer_auth(&self.config.api_token)
            .json(&SendTextRequest {
                to: customer_id,
                kind: "text",
                text,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(format!("gateway send returned {}", response.status()).into());
        }
        Ok(())
    }

    async fn download_attachment(
        &self,
        url: &str,
        customer_id: &str,
    ) -> Result<PathBuf, BoxError> {
        let bytes = self
            .client
            .get(url)
            .bearer_auth(&self.config.api_token)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let dir = Path::new(&self.config.media_dir).join(customer_id);
        tokio::fs::create_dir_all(&dir).await?;

        let extension = url.rsplit('.').next().filter(|e| e.len() <= 4).unwrap_or("jpg");
        let file = dir.join(format!("{}.{}", Uuid::new_v4(), extension));
        tokio::fs::write(&file, &bytes).await?;

        tracing::debug!("Saved attachment for customer to {}", file.display());
        Ok(file)
    }
}

use crate::app_config::ModelGenConfig;
use async_trait::async_trait;
use ffc_core::{BoxError, GeneratedModel, ModelGenerator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for the photo-to-model automation sidecar. One call drives a full
/// browser-automation session on the other side, so the timeout is
/// generous; retries belong to the pipeline, not here.
pub struct HttpModelGenerator {
    config: ModelGenConfig,
    client: reqwest::Client,
}

impl HttpModelGenerator {
    pub fn new(config: ModelGenConfig) -> Result<Self, BoxError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;
        Ok(Self { config, client })
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    photo_path: &'a str,
    output_dir: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    success: bool,
    model_path: Option<String>,
    error: Option<String>,
}

#[async_trait]
impl ModelGenerator for HttpModelGenerator {
    async fn generate(
        &self,
        photo_path: &str,
        output_dir: &str,
    ) -> Result<GeneratedModel, BoxError> {
        let response: GenerateResponse = self
            .client
            .post(format!("{}/generate", self.config.base_url))
            .json(&GenerateRequest {
                photo_path,
                output_dir,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !response.success {
            return Err(response
                .error
                .unwrap_or_else(|| "model generation failed without detail".to_string())
                .into());
        }

        match response.model_path {
            Some(model_path) => Ok(GeneratedModel { model_path }),
            None => Err("model generation reported success without a model path".into()),
        }
    }
}

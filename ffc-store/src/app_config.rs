use ffc_catalog::PricingConfig;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub gateway: GatewayConfig,
    pub modelgen: ModelGenConfig,
    pub vendor: VendorConfig,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub pricing: PricingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
    /// Shared passphrase the dashboard login exchanges for a JWT
    pub operator_passphrase: String,
}

/// Chat gateway (the messaging transport's HTTP API)
#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub api_token: String,
    /// Where downloaded customer photos land, one subdirectory per customer
    #[serde(default = "default_media_dir")]
    pub media_dir: String,
}

fn default_media_dir() -> String {
    "./media".to_string()
}

/// Photo-to-model automation sidecar
#[derive(Debug, Deserialize, Clone)]
pub struct ModelGenConfig {
    pub base_url: String,
    #[serde(default = "default_model_output_dir")]
    pub output_dir: String,
    /// A single generation run can take tens of seconds
    #[serde(default = "default_modelgen_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_model_output_dir() -> String {
    "./models".to_string()
}

fn default_modelgen_timeout() -> u64 {
    180
}

/// Cloud print vendor API
#[derive(Debug, Deserialize, Clone)]
pub struct VendorConfig {
    pub base_url: String,
    /// Ordering credential. Quoting works without it; auto-ordering is
    /// skipped when absent.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,
}

fn default_poll_interval() -> u64 {
    2
}

fn default_poll_attempts() -> u32 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct PipelineSettings {
    #[serde(default = "default_generation_attempts")]
    pub generation_attempts: u32,
    #[serde(default = "default_generation_retry_delay")]
    pub generation_retry_delay_seconds: u64,
    /// Run the fulfillment pipeline automatically when a chat turn confirms
    /// an order
    #[serde(default)]
    pub auto_fulfill: bool,
}

fn default_generation_attempts() -> u32 {
    2
}

fn default_generation_retry_delay() -> u64 {
    3
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            generation_attempts: default_generation_attempts(),
            generation_retry_delay_seconds: default_generation_retry_delay(),
            auto_fulfill: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file (optional)
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Environment variables with a prefix of FFC, e.g.
            // FFC__DATABASE__URL
            .add_source(config::Environment::with_prefix("FFC").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

use ffc_chat::{ChatEngine, MessageStore};
use ffc_core::PrintVendorClient;
use ffc_order::{OrderAdmin, OrderPipeline, OrderStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
    pub operator_passphrase: String,
}

#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<dyn OrderStore>,
    pub messages: Arc<dyn MessageStore>,
    pub engine: Arc<ChatEngine>,
    pub pipeline: Arc<OrderPipeline>,
    pub admin: Arc<OrderAdmin>,
    pub vendor: Arc<dyn PrintVendorClient>,
    pub auth: AuthConfig,
    /// Kick the fulfillment pipeline automatically when a chat turn
    /// confirms an order
    pub auto_fulfill: bool,
}

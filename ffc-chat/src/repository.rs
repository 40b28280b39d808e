use crate::models::{ConversationState, Message};
use async_trait::async_trait;
use ffc_core::BoxError;

/// Repository trait for the append-only message log
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn append_message(&self, message: &Message) -> Result<(), BoxError>;

    /// Full conversation log for one customer, oldest first.
    async fn list_messages(&self, customer_id: &str) -> Result<Vec<Message>, BoxError>;
}

/// Repository trait for per-customer conversation state
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn get_state(&self, customer_id: &str) -> Result<Option<ConversationState>, BoxError>;

    async fn set_state(&self, state: &ConversationState) -> Result<(), BoxError>;
}

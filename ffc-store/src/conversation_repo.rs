use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ffc_chat::{ConversationStage, ConversationState, ConversationStore};
use ffc_core::BoxError;
use ffc_shared::OrderId;
use sqlx::PgPool;

pub struct PgConversationStore {
    pool: PgPool,
}

impl PgConversationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct StateRow {
    customer_id: String,
    stage: String,
    pending_order_id: Option<String>,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl ConversationStore for PgConversationStore {
    async fn get_state(&self, customer_id: &str) -> Result<Option<ConversationState>, BoxError> {
        let row: Option<StateRow> = sqlx::query_as(
            "SELECT customer_id, stage, pending_order_id, updated_at FROM conversation_state WHERE customer_id = $1",
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| ConversationState {
            customer_id: row.customer_id,
            // Unknown stage strings re-enter the flow as NEW.
            stage: ConversationStage::from_store(&row.stage),
            pending_order_id: row.pending_order_id.map(OrderId::new),
            updated_at: row.updated_at,
        }))
    }

    async fn set_state(&self, state: &ConversationState) -> Result<(), BoxError> {
        sqlx::query(
            r#"
            INSERT INTO conversation_state (customer_id, stage, pending_order_id, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (customer_id)
            DO UPDATE SET stage = $2, pending_order_id = $3, updated_at = $4
            "#,
        )
        .bind(&state.customer_id)
        .bind(state.stage.as_str())
        .bind(state.pending_order_id.as_ref().map(|id| id.as_str()))
        .bind(state.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

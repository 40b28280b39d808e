use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ffc_chat::{Message, MessageDirection, MessageStore};
use ffc_core::BoxError;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    customer_id: String,
    direction: String,
    body: String,
    sent_at: DateTime<Utc>,
}

impl MessageRow {
    fn into_message(self) -> Message {
        let direction = match self.direction.as_str() {
            "inbound" => MessageDirection::Inbound,
            _ => MessageDirection::Outbound,
        };
        Message {
            id: self.id,
            customer_id: self.customer_id,
            direction,
            body: self.body,
            sent_at: self.sent_at,
        }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn append_message(&self, message: &Message) -> Result<(), BoxError> {
        sqlx::query(
            "INSERT INTO messages (id, customer_id, direction, body, sent_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(message.id)
        .bind(&message.customer_id)
        .bind(message.direction.as_str())
        .bind(&message.body)
        .bind(message.sent_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_messages(&self, customer_id: &str) -> Result<Vec<Message>, BoxError> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT id, customer_id, direction, body, sent_at FROM messages WHERE customer_id = $1 ORDER BY sent_at ASC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MessageRow::into_message).collect())
    }
}

use axum::{extract::State, http::StatusCode, Json};
use ffc_chat::{InboundAttachment, InboundMessage};
use ffc_shared::Masked;
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatWebhook {
    pub events: Vec<ChatEvent>,
}

#[derive(Debug, Deserialize)]
pub struct ChatEvent {
    pub customer_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<InboundAttachment>,
    #[serde(default)]
    pub sender_name: Option<String>,
}

/// POST /v1/webhooks/chat
/// Receive a delivery batch from the chat gateway. Events run strictly one
/// at a time: each customer's turn finishes its store writes before the
/// next event starts. The gateway gets a 200 once the batch is processed —
/// per-event failures are logged, not bounced back for redelivery.
pub async fn handle_chat_webhook(
    State(state): State<AppState>,
    Json(payload): Json<ChatWebhook>,
) -> Result<StatusCode, StatusCode> {
    tracing::info!("Received chat webhook with {} events", payload.events.len());

    for event in payload.events {
        let inbound = InboundMessage {
            text: event.text,
            attachments: event.attachments,
            sender_name: event.sender_name,
        };

        match state.engine.handle_incoming(&event.customer_id, &inbound).await {
            Ok(outcome) => {
                if let Some(order_id) = outcome.confirmed_order {
                    if state.auto_fulfill {
                        tracing::info!("Order {} confirmed, starting fulfillment", order_id);
                        let pipeline = state.pipeline.clone();
                        tokio::spawn(async move {
                            pipeline.run(&order_id).await;
                        });
                    }
                }
            }
            Err(err) => {
                tracing::error!(
                    "Chat turn failed for customer {:?}: {}",
                    Masked(event.customer_id),
                    err
                );
            }
        }
    }

    Ok(StatusCode::OK)
}

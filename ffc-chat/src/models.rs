use crate::stage::ConversationStage;
use chrono::{DateTime, Utc};
use ffc_shared::OrderId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageDirection {
    Inbound,
    Outbound,
}

impl MessageDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageDirection::Inbound => "inbound",
            MessageDirection::Outbound => "outbound",
        }
    }
}

/// One text exchanged with a customer. Append-only: never mutated, never
/// deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub customer_id: String,
    pub direction: MessageDirection,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    pub fn inbound(customer_id: &str, body: &str) -> Self {
        Self::record(customer_id, MessageDirection::Inbound, body)
    }

    pub fn outbound(customer_id: &str, body: &str) -> Self {
        Self::record(customer_id, MessageDirection::Outbound, body)
    }

    fn record(customer_id: &str, direction: MessageDirection, body: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id: customer_id.to_string(),
            direction,
            body: body.to_string(),
            sent_at: Utc::now(),
        }
    }
}

/// Attachment on an inbound gateway event. Only images carry a fetchable
/// URL; everything else is ignored by the intake flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundAttachment {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: Option<String>,
}

impl InboundAttachment {
    pub fn is_image(&self) -> bool {
        self.kind.eq_ignore_ascii_case("image")
    }
}

/// One inbound chat event as the webhook hands it to the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<InboundAttachment>,
    /// Display name from the sender's gateway profile, when present
    #[serde(default)]
    pub sender_name: Option<String>,
}

impl InboundMessage {
    pub fn text_only(text: &str) -> Self {
        Self {
            text: text.to_string(),
            attachments: Vec::new(),
            sender_name: None,
        }
    }

    pub fn with_image(text: &str, url: &str) -> Self {
        Self {
            text: text.to_string(),
            attachments: vec![InboundAttachment {
                kind: "image".to_string(),
                url: Some(url.to_string()),
            }],
            sender_name: None,
        }
    }

    /// URL of the first image attachment, if any
    pub fn first_image_url(&self) -> Option<&str> {
        self.attachments
            .iter()
            .find(|a| a.is_image())
            .and_then(|a| a.url.as_deref())
    }
}

/// Per-customer conversation record. Created lazily on first contact,
/// mutated only by the chat engine, never deleted — a repeat customer keeps
/// the same record across order cycles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationState {
    pub customer_id: String,
    pub stage: ConversationStage,
    pub pending_order_id: Option<OrderId>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationState {
    pub fn initial(customer_id: &str) -> Self {
        Self {
            customer_id: customer_id.to_string(),
            stage: ConversationStage::New,
            pending_order_id: None,
            updated_at: Utc::now(),
        }
    }

    pub fn advance(&mut self, stage: ConversationStage) {
        self.stage = stage;
        self.updated_at = Utc::now();
    }
}

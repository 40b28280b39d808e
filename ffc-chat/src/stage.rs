use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a customer conversation currently sits. `Confirmed` is not
/// terminal: a further photo re-enters the photo-intake flow with a fresh
/// order on the same conversation record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversationStage {
    New,
    PhotoReceived,
    DetailsReceived,
    QuoteSent,
    Confirmed,
}

impl ConversationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationStage::New => "NEW",
            ConversationStage::PhotoReceived => "PHOTO_RECEIVED",
            ConversationStage::DetailsReceived => "DETAILS_RECEIVED",
            ConversationStage::QuoteSent => "QUOTE_SENT",
            ConversationStage::Confirmed => "CONFIRMED",
        }
    }

    /// Map a stage string read back from the store. Anything outside the
    /// five named stages re-enters the flow as `New` — the reset is a
    /// deliberate branch, not a silent fallthrough.
    pub fn from_store(raw: &str) -> Self {
        match raw {
            "NEW" => ConversationStage::New,
            "PHOTO_RECEIVED" => ConversationStage::PhotoReceived,
            "DETAILS_RECEIVED" => ConversationStage::DetailsReceived,
            "QUOTE_SENT" => ConversationStage::QuoteSent,
            "CONFIRMED" => ConversationStage::Confirmed,
            other => {
                tracing::warn!("Unknown conversation stage {:?}, resetting to NEW", other);
                ConversationStage::New
            }
        }
    }
}

impl fmt::Display for ConversationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub mod engine;
pub mod models;
pub mod parser;
pub mod replies;
pub mod repository;
pub mod stage;

pub use engine::{ChatEngine, ChatError, TurnOutcome};
pub use models::{ConversationState, InboundAttachment, InboundMessage, Message, MessageDirection};
pub use repository::{ConversationStore, MessageStore};
pub use stage::ConversationStage;

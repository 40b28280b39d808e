use crate::models::{ConversationState, InboundMessage, Message};
use crate::parser::{self, QuoteReply};
use crate::replies;
use crate::repository::{ConversationStore, MessageStore};
use crate::stage::ConversationStage;
use ffc_catalog::{FulfillmentMode, Material, QuoteCalculator, SizeClass};
use ffc_core::ChatGateway;
use ffc_order::{Order, OrderStatus, OrderStore};
use ffc_shared::{Masked, OrderId};
use std::sync::Arc;

/// What one conversation turn produced. `confirmed_order` is set exactly
/// when this turn moved an order to `confirmed`, so the caller can kick off
/// fulfillment.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub stage: ConversationStage,
    pub confirmed_order: Option<OrderId>,
}

impl TurnOutcome {
    fn at(stage: ConversationStage) -> Self {
        Self {
            stage,
            confirmed_order: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("record store failed: {0}")]
    StoreFailed(String),
}

impl ChatError {
    fn store<E: std::fmt::Display>(err: E) -> Self {
        ChatError::StoreFailed(err.to_string())
    }
}

/// The per-customer conversation state machine. One instance serves every
/// customer; all per-customer state lives in the injected stores. Transport
/// failures (send, download) are logged and swallowed — the store writes of
/// a turn always complete. Store failures are the only hard errors.
pub struct ChatEngine {
    orders: Arc<dyn OrderStore>,
    messages: Arc<dyn MessageStore>,
    conversations: Arc<dyn ConversationStore>,
    gateway: Arc<dyn ChatGateway>,
    calculator: QuoteCalculator,
}

impl ChatEngine {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        messages: Arc<dyn MessageStore>,
        conversations: Arc<dyn ConversationStore>,
        gateway: Arc<dyn ChatGateway>,
        calculator: QuoteCalculator,
    ) -> Self {
        Self {
            orders,
            messages,
            conversations,
            gateway,
            calculator,
        }
    }

    /// Process one inbound chat event to completion: log it, run the stage
    /// transition, persist every mutation, send the reply.
    pub async fn handle_incoming(
        &self,
        customer_id: &str,
        inbound: &InboundMessage,
    ) -> Result<TurnOutcome, ChatError> {
        self.messages
            .append_message(&Message::inbound(customer_id, &inbound.text))
            .await
            .map_err(ChatError::store)?;

        let state = match self
            .conversations
            .get_state(customer_id)
            .await
            .map_err(ChatError::store)?
        {
            Some(state) => state,
            None => {
                // First contact: the conversation record is created lazily.
                let state = ConversationState::initial(customer_id);
                self.conversations
                    .set_state(&state)
                    .await
                    .map_err(ChatError::store)?;
                state
            }
        };

        tracing::debug!(
            "Customer {:?} at {}: {:?} ({} attachments)",
            Masked(customer_id.to_string()),
            state.stage,
            inbound.text,
            inbound.attachments.len()
        );

        match (state.stage, inbound.first_image_url()) {
            // A photo starts an order from scratch, whether this is the
            // first contact or a repeat customer coming back after a
            // completed cycle.
            (ConversationStage::New, Some(url)) | (ConversationStage::Confirmed, Some(url)) => {
                self.start_order(state, customer_id, inbound, url).await
            }
            (ConversationStage::New, None) => {
                self.reply(customer_id, replies::welcome()).await?;
                Ok(TurnOutcome::at(ConversationStage::New))
            }
            (ConversationStage::Confirmed, None) => {
                let mut state = state;
                state.pending_order_id = None;
                state.advance(ConversationStage::New);
                self.conversations
                    .set_state(&state)
                    .await
                    .map_err(ChatError::store)?;
                self.reply(customer_id, replies::welcome_back()).await?;
                Ok(TurnOutcome::at(ConversationStage::New))
            }
            (ConversationStage::PhotoReceived, _) => {
                self.handle_details(state, customer_id, inbound).await
            }
            (ConversationStage::DetailsReceived, _) => {
                self.handle_fulfillment_choice(state, customer_id, inbound).await
            }
            (ConversationStage::QuoteSent, _) => {
                self.handle_quote_reply(state, customer_id, inbound).await
            }
        }
    }

    /// NEW/CONFIRMED + image: persist the photo, open a fresh order, ask
    /// for specs.
    async fn start_order(
        &self,
        mut state: ConversationState,
        customer_id: &str,
        inbound: &InboundMessage,
        image_url: &str,
    ) -> Result<TurnOutcome, ChatError> {
        let photo_path = match self.gateway.download_attachment(image_url, customer_id).await {
            Ok(path) => Some(path.to_string_lossy().into_owned()),
            Err(err) => {
                // Transport failure: the order still opens, the pipeline
                // will refuse to run until a photo lands.
                tracing::warn!(
                    "Attachment download failed for {:?}: {}",
                    Masked(customer_id.to_string()),
                    err
                );
                None
            }
        };

        let mut order = Order::new(customer_id.to_string());
        order.photo_path = photo_path;
        order.customer_name = inbound.sender_name.clone();
        self.orders
            .create_order(&order)
            .await
            .map_err(ChatError::store)?;
        tracing::info!("Order {} opened for {:?}", order.id, Masked(customer_id.to_string()));

        state.pending_order_id = Some(order.id.clone());
        state.advance(ConversationStage::PhotoReceived);
        self.conversations
            .set_state(&state)
            .await
            .map_err(ChatError::store)?;

        self.reply(customer_id, replies::ask_for_details()).await?;
        Ok(TurnOutcome::at(ConversationStage::PhotoReceived))
    }

    /// PHOTO_RECEIVED: best-effort spec parse, then ask SELF vs CLOUD.
    async fn handle_details(
        &self,
        mut state: ConversationState,
        customer_id: &str,
        inbound: &InboundMessage,
    ) -> Result<TurnOutcome, ChatError> {
        if inbound.text.trim().is_empty() {
            self.reply(customer_id, replies::ask_resend_details()).await?;
            return Ok(TurnOutcome::at(ConversationStage::PhotoReceived));
        }

        let Some(mut order) = self.pending_order(&state).await? else {
            return self.restart_intake(state, customer_id).await;
        };

        let parsed = parser::parse_details(&inbound.text);
        if parsed.ambiguous {
            tracing::debug!(
                "Specs from {:?} were ambiguous, defaulted to {} / {}",
                Masked(customer_id.to_string()),
                parsed.material,
                parsed.size
            );
        }

        order.material = Some(parsed.material);
        order.size = Some(parsed.size);
        order.color = Some(parsed.color);
        order.rush = parsed.rush;
        order.cad_design = parsed.cad_design;
        order.touch();
        self.orders
            .update_order(&order)
            .await
            .map_err(ChatError::store)?;

        state.advance(ConversationStage::DetailsReceived);
        self.conversations
            .set_state(&state)
            .await
            .map_err(ChatError::store)?;

        self.reply(customer_id, replies::ask_fulfillment()).await?;
        Ok(TurnOutcome::at(ConversationStage::DetailsReceived))
    }

    /// DETAILS_RECEIVED: lock in the fulfillment mode, price the job, send
    /// the proposal. Anything that doesn't say CLOUD means SELF.
    async fn handle_fulfillment_choice(
        &self,
        mut state: ConversationState,
        customer_id: &str,
        inbound: &InboundMessage,
    ) -> Result<TurnOutcome, ChatError> {
        let Some(mut order) = self.pending_order(&state).await? else {
            return self.restart_intake(state, customer_id).await;
        };

        let mode = if parser::wants_cloud(&inbound.text) {
            FulfillmentMode::Cloud
        } else {
            FulfillmentMode::SelfPrint
        };

        let price = self.calculator.quote(
            order.material.unwrap_or(Material::Pla),
            order.size.unwrap_or(SizeClass::Medium),
            mode,
            order.rush,
            order.cad_design,
        );

        order.fulfillment = Some(mode);
        order.price = Some(price);
        order.touch();
        self.orders
            .update_order(&order)
            .await
            .map_err(ChatError::store)?;

        state.advance(ConversationStage::QuoteSent);
        self.conversations
            .set_state(&state)
            .await
            .map_err(ChatError::store)?;

        self.reply(customer_id, replies::proposal(&order, &price)).await?;
        Ok(TurnOutcome::at(ConversationStage::QuoteSent))
    }

    /// QUOTE_SENT: strict two-way fork, everything else re-prompts without
    /// touching order or stage.
    async fn handle_quote_reply(
        &self,
        mut state: ConversationState,
        customer_id: &str,
        inbound: &InboundMessage,
    ) -> Result<TurnOutcome, ChatError> {
        match parser::parse_quote_reply(&inbound.text) {
            QuoteReply::Accepted => {
                let Some(order) = self.pending_order(&state).await? else {
                    return self.restart_intake(state, customer_id).await;
                };

                self.orders
                    .update_order_status(&order.id, OrderStatus::Confirmed)
                    .await
                    .map_err(ChatError::store)?;

                state.advance(ConversationStage::Confirmed);
                self.conversations
                    .set_state(&state)
                    .await
                    .map_err(ChatError::store)?;

                self.reply(customer_id, replies::confirmation(&order.id)).await?;
                tracing::info!("Order {} confirmed", order.id);
                Ok(TurnOutcome {
                    stage: ConversationStage::Confirmed,
                    confirmed_order: Some(order.id),
                })
            }
            QuoteReply::Declined => {
                if let Some(order) = self.pending_order(&state).await? {
                    self.orders
                        .update_order_status(&order.id, OrderStatus::Cancelled)
                        .await
                        .map_err(ChatError::store)?;
                    tracing::info!("Order {} cancelled by customer", order.id);
                }

                state.pending_order_id = None;
                state.advance(ConversationStage::New);
                self.conversations
                    .set_state(&state)
                    .await
                    .map_err(ChatError::store)?;

                self.reply(customer_id, replies::cancelled()).await?;
                Ok(TurnOutcome::at(ConversationStage::New))
            }
            QuoteReply::Unclear => {
                self.reply(customer_id, replies::reprompt_yes_no()).await?;
                Ok(TurnOutcome::at(ConversationStage::QuoteSent))
            }
        }
    }

    /// Resolve the order this conversation is building. The explicit
    /// `pending_order_id` reference wins; the active-order lookup covers a
    /// missing or stale reference.
    async fn pending_order(&self, state: &ConversationState) -> Result<Option<Order>, ChatError> {
        if let Some(id) = &state.pending_order_id {
            if let Some(order) = self
                .orders
                .get_order(id)
                .await
                .map_err(ChatError::store)?
            {
                if !order.is_cancelled() {
                    return Ok(Some(order));
                }
            }
        }

        self.orders
            .active_order_for_customer(&state.customer_id)
            .await
            .map_err(ChatError::store)
    }

    /// The conversation points at an order that no longer resolves. Reset
    /// to the top of the flow instead of wedging the customer.
    async fn restart_intake(
        &self,
        mut state: ConversationState,
        customer_id: &str,
    ) -> Result<TurnOutcome, ChatError> {
        tracing::warn!(
            "Pending order missing for {:?}, restarting intake",
            Masked(customer_id.to_string())
        );
        state.pending_order_id = None;
        state.advance(ConversationStage::New);
        self.conversations
            .set_state(&state)
            .await
            .map_err(ChatError::store)?;
        self.reply(customer_id, replies::welcome()).await?;
        Ok(TurnOutcome::at(ConversationStage::New))
    }

    /// Send a reply and append it to the message log. A send failure is
    /// logged, never retried, and never blocks the transition.
    async fn reply(&self, customer_id: &str, text: String) -> Result<(), ChatError> {
        if let Err(err) = self.gateway.send_text(customer_id, &text).await {
            tracing::warn!(
                "Reply to {:?} failed to send: {}",
                Masked(customer_id.to_string()),
                err
            );
        }
        self.messages
            .append_message(&Message::outbound(customer_id, &text))
            .await
            .map_err(ChatError::store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageDirection;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use ffc_core::{BoxError, MockChatGateway};
    use ffc_order::repository::OrderStats;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// One in-memory store backing all three repository traits, so a single
    /// fixture can drive full conversations.
    struct TestStore {
        orders: Mutex<Vec<Order>>,
        messages: Mutex<Vec<Message>>,
        states: Mutex<HashMap<String, ConversationState>>,
    }

    impl TestStore {
        fn new() -> Self {
            Self {
                orders: Mutex::new(Vec::new()),
                messages: Mutex::new(Vec::new()),
                states: Mutex::new(HashMap::new()),
            }
        }

        fn orders_for(&self, customer_id: &str) -> Vec<Order> {
            self.orders
                .lock()
                .unwrap()
                .iter()
                .filter(|o| o.customer_id == customer_id)
                .cloned()
                .collect()
        }

        fn state_for(&self, customer_id: &str) -> ConversationState {
            self.states.lock().unwrap()[customer_id].clone()
        }

        fn messages_for(&self, customer_id: &str) -> Vec<Message> {
            self.messages
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.customer_id == customer_id)
                .cloned()
                .collect()
        }
    }

    #[async_trait]
    impl OrderStore for TestStore {
        async fn create_order(&self, order: &Order) -> Result<(), BoxError> {
            self.orders.lock().unwrap().push(order.clone());
            Ok(())
        }

        async fn get_order(&self, id: &OrderId) -> Result<Option<Order>, BoxError> {
            Ok(self
                .orders
                .lock()
                .unwrap()
                .iter()
                .find(|o| &o.id == id)
                .cloned())
        }

        async fn update_order(&self, order: &Order) -> Result<(), BoxError> {
            let mut orders = self.orders.lock().unwrap();
            if let Some(slot) = orders.iter_mut().find(|o| o.id == order.id) {
                *slot = order.clone();
            }
            Ok(())
        }

        async fn update_order_status(
            &self,
            id: &OrderId,
            status: OrderStatus,
        ) -> Result<(), BoxError> {
            let mut orders = self.orders.lock().unwrap();
            if let Some(order) = orders.iter_mut().find(|o| &o.id == id) {
                order.update_status(status);
            }
            Ok(())
        }

        async fn active_order_for_customer(
            &self,
            customer_id: &str,
        ) -> Result<Option<Order>, BoxError> {
            Ok(self
                .orders
                .lock()
                .unwrap()
                .iter()
                .filter(|o| o.customer_id == customer_id && !o.is_cancelled())
                .last()
                .cloned())
        }

        async fn list_recent_orders(&self, limit: usize) -> Result<Vec<Order>, BoxError> {
            let orders = self.orders.lock().unwrap();
            Ok(orders.iter().rev().take(limit).cloned().collect())
        }

        async fn order_stats(&self, _since: DateTime<Utc>) -> Result<OrderStats, BoxError> {
            Ok(OrderStats::default())
        }
    }

    #[async_trait]
    impl MessageStore for TestStore {
        async fn append_message(&self, message: &Message) -> Result<(), BoxError> {
            self.messages.lock().unwrap().push(message.clone());
            Ok(())
        }

        async fn list_messages(&self, customer_id: &str) -> Result<Vec<Message>, BoxError> {
            Ok(self.messages_for(customer_id))
        }
    }

    #[async_trait]
    impl ConversationStore for TestStore {
        async fn get_state(
            &self,
            customer_id: &str,
        ) -> Result<Option<ConversationState>, BoxError> {
            Ok(self.states.lock().unwrap().get(customer_id).cloned())
        }

        async fn set_state(&self, state: &ConversationState) -> Result<(), BoxError> {
            self.states
                .lock()
                .unwrap()
                .insert(state.customer_id.clone(), state.clone());
            Ok(())
        }
    }

    const CUSTOMER: &str = "15551230001";

    struct Fixture {
        engine: ChatEngine,
        store: Arc<TestStore>,
        gateway: Arc<MockChatGateway>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(TestStore::new());
        let gateway = Arc::new(MockChatGateway::new());
        let engine = ChatEngine::new(
            store.clone(),
            store.clone(),
            store.clone(),
            gateway.clone(),
            QuoteCalculator::default(),
        );
        Fixture {
            engine,
            store,
            gateway,
        }
    }

    async fn drive_photo_and_details(f: &Fixture) {
        f.engine
            .handle_incoming(
                CUSTOMER,
                &InboundMessage::with_image("", "https://cdn.gw.example/media/drawer.jpg"),
            )
            .await
            .unwrap();
        f.engine
            .handle_incoming(CUSTOMER, &InboundMessage::text_only("PETG, red, small"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_first_photo_creates_order() {
        let f = fixture();
        let outcome = f
            .engine
            .handle_incoming(
                CUSTOMER,
                &InboundMessage::with_image("here you go", "https://cdn.gw.example/media/drawer.jpg"),
            )
            .await
            .unwrap();

        assert_eq!(outcome.stage, ConversationStage::PhotoReceived);

        let orders = f.store.orders_for(CUSTOMER);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, OrderStatus::New);
        assert!(orders[0].photo_path.as_deref().unwrap().ends_with("drawer.jpg"));

        let state = f.store.state_for(CUSTOMER);
        assert_eq!(state.stage, ConversationStage::PhotoReceived);
        assert_eq!(state.pending_order_id, Some(orders[0].id.clone()));

        let reply = f.gateway.last_message_to(CUSTOMER).unwrap();
        assert!(reply.contains("material"));
    }

    #[tokio::test]
    async fn test_text_without_photo_gets_welcome() {
        let f = fixture();
        let outcome = f
            .engine
            .handle_incoming(CUSTOMER, &InboundMessage::text_only("hello?"))
            .await
            .unwrap();

        assert_eq!(outcome.stage, ConversationStage::New);
        assert!(f.store.orders_for(CUSTOMER).is_empty());
        assert!(f
            .gateway
            .last_message_to(CUSTOMER)
            .unwrap()
            .contains("photo"));
    }

    #[tokio::test]
    async fn test_details_stored_and_fulfillment_asked() {
        let f = fixture();
        drive_photo_and_details(&f).await;

        let order = &f.store.orders_for(CUSTOMER)[0];
        assert_eq!(order.material, Some(Material::Petg));
        assert_eq!(order.size, Some(SizeClass::Small));
        assert_eq!(order.color.as_deref(), Some("red"));

        assert_eq!(f.store.state_for(CUSTOMER).stage, ConversationStage::DetailsReceived);
        assert!(f
            .gateway
            .last_message_to(CUSTOMER)
            .unwrap()
            .contains("CLOUD"));
    }

    #[tokio::test]
    async fn test_empty_details_reprompts_without_mutation() {
        let f = fixture();
        f.engine
            .handle_incoming(
                CUSTOMER,
                &InboundMessage::with_image("", "https://cdn.gw.example/media/drawer.jpg"),
            )
            .await
            .unwrap();

        let outcome = f
            .engine
            .handle_incoming(CUSTOMER, &InboundMessage::text_only("   "))
            .await
            .unwrap();

        assert_eq!(outcome.stage, ConversationStage::PhotoReceived);
        assert_eq!(f.store.state_for(CUSTOMER).stage, ConversationStage::PhotoReceived);
        assert!(f.store.orders_for(CUSTOMER)[0].material.is_none());
        assert!(f
            .gateway
            .last_message_to(CUSTOMER)
            .unwrap()
            .contains("resend"));
    }

    #[tokio::test]
    async fn test_cloud_choice_quotes_and_sends_total() {
        let f = fixture();
        drive_photo_and_details(&f).await;

        let outcome = f
            .engine
            .handle_incoming(CUSTOMER, &InboundMessage::text_only("I'll do cloud printing"))
            .await
            .unwrap();

        assert_eq!(outcome.stage, ConversationStage::QuoteSent);

        let order = &f.store.orders_for(CUSTOMER)[0];
        assert_eq!(order.fulfillment, Some(FulfillmentMode::Cloud));
        let price = order.price.unwrap();
        // PETG small via cloud: 1800 * 1.25 + 800 shipping
        assert_eq!(price.total_cents, 2250 + 800);

        let proposal = f.gateway.last_message_to(CUSTOMER).unwrap();
        assert!(proposal.contains("Total:"));
    }

    #[tokio::test]
    async fn test_anything_but_cloud_means_self() {
        let f = fixture();
        drive_photo_and_details(&f).await;

        f.engine
            .handle_incoming(CUSTOMER, &InboundMessage::text_only("you do it please"))
            .await
            .unwrap();

        let order = &f.store.orders_for(CUSTOMER)[0];
        assert_eq!(order.fulfillment, Some(FulfillmentMode::SelfPrint));
    }

    #[tokio::test]
    async fn test_decline_cancels_and_resets() {
        let f = fixture();
        drive_photo_and_details(&f).await;
        f.engine
            .handle_incoming(CUSTOMER, &InboundMessage::text_only("self"))
            .await
            .unwrap();

        let outcome = f
            .engine
            .handle_incoming(CUSTOMER, &InboundMessage::text_only("nah, no thanks"))
            .await
            .unwrap();

        assert_eq!(outcome.stage, ConversationStage::New);
        assert!(outcome.confirmed_order.is_none());

        let order = &f.store.orders_for(CUSTOMER)[0];
        assert_eq!(order.status, OrderStatus::Cancelled);

        let state = f.store.state_for(CUSTOMER);
        assert_eq!(state.stage, ConversationStage::New);
        assert!(state.pending_order_id.is_none());
    }

    #[tokio::test]
    async fn test_confirm_moves_to_confirmed() {
        let f = fixture();
        drive_photo_and_details(&f).await;
        f.engine
            .handle_incoming(CUSTOMER, &InboundMessage::text_only("cloud"))
            .await
            .unwrap();

        let outcome = f
            .engine
            .handle_incoming(CUSTOMER, &InboundMessage::text_only("YES"))
            .await
            .unwrap();

        assert_eq!(outcome.stage, ConversationStage::Confirmed);

        let order = &f.store.orders_for(CUSTOMER)[0];
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(outcome.confirmed_order, Some(order.id.clone()));

        let reply = f.gateway.last_message_to(CUSTOMER).unwrap();
        assert!(reply.contains(order.id.as_str()));
    }

    #[tokio::test]
    async fn test_unclear_reply_reprompts_without_mutation() {
        let f = fixture();
        drive_photo_and_details(&f).await;
        f.engine
            .handle_incoming(CUSTOMER, &InboundMessage::text_only("self"))
            .await
            .unwrap();
        let before = f.store.orders_for(CUSTOMER)[0].clone();

        let outcome = f
            .engine
            .handle_incoming(CUSTOMER, &InboundMessage::text_only("how long does it take?"))
            .await
            .unwrap();

        assert_eq!(outcome.stage, ConversationStage::QuoteSent);
        assert_eq!(f.store.state_for(CUSTOMER).stage, ConversationStage::QuoteSent);
        assert_eq!(f.store.orders_for(CUSTOMER)[0], before);
        assert!(f
            .gateway
            .last_message_to(CUSTOMER)
            .unwrap()
            .contains("YES"));
    }

    #[tokio::test]
    async fn test_confirmed_photo_starts_new_order() {
        let f = fixture();
        drive_photo_and_details(&f).await;
        f.engine
            .handle_incoming(CUSTOMER, &InboundMessage::text_only("self"))
            .await
            .unwrap();
        f.engine
            .handle_incoming(CUSTOMER, &InboundMessage::text_only("yes"))
            .await
            .unwrap();

        let outcome = f
            .engine
            .handle_incoming(
                CUSTOMER,
                &InboundMessage::with_image("another one", "https://cdn.gw.example/media/kitchen.jpg"),
            )
            .await
            .unwrap();

        assert_eq!(outcome.stage, ConversationStage::PhotoReceived);

        let orders = f.store.orders_for(CUSTOMER);
        assert_eq!(orders.len(), 2);
        // The confirmed order is untouched; the new one is pending.
        assert_eq!(orders[0].status, OrderStatus::Confirmed);
        assert_eq!(orders[1].status, OrderStatus::New);
        assert_eq!(
            f.store.state_for(CUSTOMER).pending_order_id,
            Some(orders[1].id.clone())
        );
    }

    #[tokio::test]
    async fn test_confirmed_text_resets_to_new() {
        let f = fixture();
        drive_photo_and_details(&f).await;
        f.engine
            .handle_incoming(CUSTOMER, &InboundMessage::text_only("self"))
            .await
            .unwrap();
        f.engine
            .handle_incoming(CUSTOMER, &InboundMessage::text_only("yes"))
            .await
            .unwrap();

        let outcome = f
            .engine
            .handle_incoming(CUSTOMER, &InboundMessage::text_only("thanks!"))
            .await
            .unwrap();

        assert_eq!(outcome.stage, ConversationStage::New);
        let state = f.store.state_for(CUSTOMER);
        assert_eq!(state.stage, ConversationStage::New);
        assert!(state.pending_order_id.is_none());
        assert!(f
            .gateway
            .last_message_to(CUSTOMER)
            .unwrap()
            .contains("Welcome back"));
    }

    #[tokio::test]
    async fn test_send_failure_never_blocks_the_transition() {
        let f = fixture();
        f.gateway.fail_sends(true);

        let outcome = f
            .engine
            .handle_incoming(
                CUSTOMER,
                &InboundMessage::with_image("", "https://cdn.gw.example/media/drawer.jpg"),
            )
            .await
            .unwrap();

        assert_eq!(outcome.stage, ConversationStage::PhotoReceived);
        assert_eq!(f.store.state_for(CUSTOMER).stage, ConversationStage::PhotoReceived);

        // The outbound text still lands in the log even though delivery failed.
        let messages = f.store.messages_for(CUSTOMER);
        assert!(messages
            .iter()
            .any(|m| m.direction == MessageDirection::Outbound));
    }

    #[tokio::test]
    async fn test_download_failure_leaves_photo_unset() {
        let f = fixture();
        f.gateway.fail_downloads(true);

        f.engine
            .handle_incoming(
                CUSTOMER,
                &InboundMessage::with_image("", "https://cdn.gw.example/media/drawer.jpg"),
            )
            .await
            .unwrap();

        let order = &f.store.orders_for(CUSTOMER)[0];
        assert!(order.photo_path.is_none());
        assert_eq!(f.store.state_for(CUSTOMER).stage, ConversationStage::PhotoReceived);
    }

    #[tokio::test]
    async fn test_stale_pending_reference_falls_back_to_active_order() {
        let f = fixture();
        f.engine
            .handle_incoming(
                CUSTOMER,
                &InboundMessage::with_image("", "https://cdn.gw.example/media/drawer.jpg"),
            )
            .await
            .unwrap();

        // Simulate a crash between writes: the stage survived but the
        // order reference did not.
        let mut state = f.store.state_for(CUSTOMER);
        state.pending_order_id = None;
        f.store.set_state(&state).await.unwrap();

        f.engine
            .handle_incoming(CUSTOMER, &InboundMessage::text_only("pla, blue, medium"))
            .await
            .unwrap();

        let order = &f.store.orders_for(CUSTOMER)[0];
        assert_eq!(order.color.as_deref(), Some("blue"));
        assert_eq!(f.store.state_for(CUSTOMER).stage, ConversationStage::DetailsReceived);
    }

    #[tokio::test]
    async fn test_both_directions_logged() {
        let f = fixture();
        f.engine
            .handle_incoming(CUSTOMER, &InboundMessage::text_only("hi"))
            .await
            .unwrap();

        let messages = f.store.messages_for(CUSTOMER);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].direction, MessageDirection::Inbound);
        assert_eq!(messages[1].direction, MessageDirection::Outbound);
    }
}

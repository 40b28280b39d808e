use crate::BoxError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Outbound side of the chat transport. The webhook delivers inbound events;
/// everything the shop says back goes through here.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Deliver a text reply to a customer conversation.
    async fn send_text(&self, customer_id: &str, text: &str) -> Result<(), BoxError>;

    /// Fetch an inbound attachment to local disk and return the saved path.
    async fn download_attachment(&self, url: &str, customer_id: &str)
        -> Result<PathBuf, BoxError>;
}

/// In-memory gateway for tests: records every send, serves downloads from a
/// fake media root, and can be flipped into a failing transport.
pub struct MockChatGateway {
    sent: Mutex<Vec<(String, String)>>,
    fail_sends: AtomicBool,
    fail_downloads: AtomicBool,
}

impl MockChatGateway {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_sends: AtomicBool::new(false),
            fail_downloads: AtomicBool::new(false),
        }
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn fail_downloads(&self, fail: bool) {
        self.fail_downloads.store(fail, Ordering::SeqCst);
    }

    /// Every (customer_id, text) pair sent so far, in order.
    pub fn sent_messages(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_message_to(&self, customer_id: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == customer_id)
            .map(|(_, text)| text.clone())
    }
}

impl Default for MockChatGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatGateway for MockChatGateway {
    async fn send_text(&self, customer_id: &str, text: &str) -> Result<(), BoxError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err("simulated transport failure".into());
        }
        self.sent
            .lock()
            .unwrap()
            .push((customer_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn download_attachment(
        &self,
        url: &str,
        customer_id: &str,
    ) -> Result<PathBuf, BoxError> {
        if self.fail_downloads.load(Ordering::SeqCst) {
            return Err("simulated download failure".into());
        }
        let file = url.rsplit('/').next().unwrap_or("attachment.jpg");
        Ok(PathBuf::from(format!("/tmp/ffc-media/{}/{}", customer_id, file)))
    }
}

//! Chat panels and their transports
//!
//! The assistant and the partner message channel share one transport
//! seam so a real chat backend can replace the stubs without touching
//! the state machine. The shipped transports are mocks: the assistant
//! answers every message with a canned line after a short delay, and the
//! partner channel delivers nothing at all (local echo only).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const ASSISTANT_GREETING: &str =
    "Hi! I'm here to help with translations and corrections during your conversation.";
pub const ASSISTANT_REPLY: &str =
    "I understand your question. How can I assist you with your language practice?";
pub const CHAT_STARTED: &str = "Chat started";

const ASSISTANT_REPLY_DELAY: Duration = Duration::from_secs(1);

/// Who produced a chat line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
    Partner,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatLine {
    pub role: ChatRole,
    pub text: String,
}

impl ChatLine {
    pub fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Delivery seam for one chat panel
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Line shown when the panel first opens
    fn opening_line(&self) -> Option<ChatLine>;

    /// Deliver a user message; resolves to the remote reply, if any
    async fn send(&self, text: &str) -> Option<ChatLine>;
}

/// Mock AI helper: one canned reply per message
pub struct AssistantStub;

#[async_trait]
impl ChatTransport for AssistantStub {
    fn opening_line(&self) -> Option<ChatLine> {
        Some(ChatLine::new(ChatRole::Assistant, ASSISTANT_GREETING))
    }

    async fn send(&self, _text: &str) -> Option<ChatLine> {
        tokio::time::sleep(ASSISTANT_REPLY_DELAY).await;
        Some(ChatLine::new(ChatRole::Assistant, ASSISTANT_REPLY))
    }
}

/// Partner message channel: nothing is ever delivered
pub struct PartnerChannel;

#[async_trait]
impl ChatTransport for PartnerChannel {
    fn opening_line(&self) -> Option<ChatLine> {
        Some(ChatLine::new(ChatRole::System, CHAT_STARTED))
    }

    async fn send(&self, _text: &str) -> Option<ChatLine> {
        None
    }
}

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    messaging::types::OutgoingMessage,
    Result,
};

/// Cross-messenger port.
///
/// Telegram is the only implementation; the relay talks to it exclusively
/// through this trait so tests can record what would have been sent.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_message(&self, chat_id: ChatId, msg: &OutgoingMessage) -> Result<MessageRef>;
    async fn edit_message(&self, target: MessageRef, msg: &OutgoingMessage) -> Result<()>;

    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()>;
}

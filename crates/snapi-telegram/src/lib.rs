//! Telegram adapter (teloxide).
//!
//! This crate implements the `snapi-core` MessagingPort over Telegram Bot API
//! and feeds Telegram updates into the core relay.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode},
};

use tokio::time::sleep;

pub mod handlers;
pub mod router;

use snapi_core::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{InlineKeyboard, OutgoingMessage, TextFormat},
    },
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    /// Retries once when Telegram asks us to back off (flood control).
    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        tracing::warn!(wait = ?d, "telegram flood control, retrying");
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

/// One button per row; `None` when the message carries no menu.
pub fn to_markup(keyboard: &InlineKeyboard) -> Option<InlineKeyboardMarkup> {
    if keyboard.is_empty() {
        return None;
    }
    let rows: Vec<Vec<InlineKeyboardButton>> = keyboard
        .buttons
        .iter()
        .map(|b| {
            vec![InlineKeyboardButton::callback(
                b.label.clone(),
                b.callback_data.clone(),
            )]
        })
        .collect();
    Some(InlineKeyboardMarkup::new(rows))
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_message(&self, chat_id: ChatId, msg: &OutgoingMessage) -> Result<MessageRef> {
        let markup = to_markup(&msg.keyboard);
        let sent = self
            .with_retry(|| {
                let mut req = self
                    .bot
                    .send_message(Self::tg_chat(chat_id), msg.text.clone());
                if msg.format == TextFormat::Html {
                    req = req.parse_mode(ParseMode::Html);
                }
                if let Some(markup) = markup.clone() {
                    req = req.reply_markup(markup);
                }
                req
            })
            .await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(sent.id.0),
        })
    }

    async fn edit_message(&self, target: MessageRef, msg: &OutgoingMessage) -> Result<()> {
        let markup = to_markup(&msg.keyboard);
        self.with_retry(|| {
            let mut req = self.bot.edit_message_text(
                Self::tg_chat(target.chat_id),
                Self::tg_msg_id(target.message_id),
                msg.text.clone(),
            );
            if msg.format == TextFormat::Html {
                req = req.parse_mode(ParseMode::Html);
            }
            if let Some(markup) = markup.clone() {
                req = req.reply_markup(markup);
            }
            req
        })
        .await?;
        Ok(())
    }

    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        self.with_retry(|| {
            let mut req = self.bot.answer_callback_query(callback_id.to_string());
            if let Some(t) = text {
                req = req.text(t.to_string());
            }
            req
        })
        .await?;
        Ok(())
    }
}

//! Telegram update handlers.
//!
//! Each handler converts a teloxide update into the core update model and
//! hands it to the relay. Failures are logged; the dispatcher never sees them.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message, User},
};

use snapi_core::{
    domain::{Sender, UserId},
    messaging::types::IncomingUpdate,
};

use crate::router::AppState;
mod callback;
mod commands;

pub async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    callback::handle_callback(q, state).await
}

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    if let Some(text) = msg.text() {
        if text.starts_with('/') {
            return commands::handle_command(msg, state).await;
        }
    }

    tracing::debug!(chat_id = msg.chat.id.0, "ignoring non-command message");
    Ok(())
}

fn sender_from(user: &User) -> Sender {
    Sender {
        user_id: UserId(user.id.0 as i64),
        first_name: user.first_name.clone(),
    }
}

async fn dispatch(state: &AppState, update: IncomingUpdate) {
    if let Err(e) = state.relay.handle(update).await {
        tracing::warn!(error = %e, "failed to deliver screen");
    }
}

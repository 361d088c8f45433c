use std::sync::Arc;

use teloxide::prelude::*;

use snapi_core::{
    domain::{ChatId, MessageId, MessageRef},
    messaging::types::{CallbackQuery as CoreCallback, IncomingUpdate},
};

use crate::router::AppState;

use super::{dispatch, sender_from};

pub async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    let message = q.message.as_ref().map(|m| MessageRef {
        chat_id: ChatId(m.chat.id.0),
        message_id: MessageId(m.id.0),
    });

    let update = IncomingUpdate::Callback(CoreCallback {
        sender: sender_from(&q.from),
        callback_id: q.id.clone(),
        data: q.data.clone().unwrap_or_default(),
        message,
    });

    dispatch(&state, update).await;
    Ok(())
}

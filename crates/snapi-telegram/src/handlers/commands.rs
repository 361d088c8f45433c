use std::sync::Arc;

use teloxide::prelude::*;

use snapi_core::{
    domain::ChatId,
    messaging::types::{Command, IncomingUpdate},
};

use crate::router::AppState;

use super::{dispatch, sender_from};

/// Lowercased command name; arguments are not used by any command.
fn parse_command(text: &str) -> String {
    // Telegram may send `/cmd@botname arg1 ...`
    let first = text.split_whitespace().next().unwrap_or("");

    first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase()
}

pub async fn handle_command(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let (Some(user), Some(text)) = (msg.from(), msg.text()) else {
        return Ok(());
    };

    let name = parse_command(text);
    let update = IncomingUpdate::Command(Command {
        chat_id: ChatId(msg.chat.id.0),
        sender: sender_from(user),
        name,
    });

    dispatch(&state, update).await;
    Ok(())
}

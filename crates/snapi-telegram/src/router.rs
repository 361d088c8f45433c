use std::sync::Arc;

use anyhow::Context;
use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use snapi_core::{
    api::SnapiApi, config::Config, messaging::port::MessagingPort, relay::Relay,
    screens::AboutInfo,
};

use crate::handlers;
use crate::TelegramMessenger;

/// Process-wide context handed to every update handler.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

pub async fn run_polling(cfg: Arc<Config>, api: Arc<dyn SnapiApi>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    let me = bot
        .get_me()
        .await
        .context("telegram rejected the bot token")?;
    tracing::info!(username = %me.username(), "SNAPI bot started");
    tracing::info!(url = %cfg.snapi_url, "connecting to SNAPI");
    tracing::info!(key = %cfg.api_key_preview(), "using SNAPI key");

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let relay = Arc::new(Relay::new(api, messenger, AboutInfo::from(cfg.as_ref())));

    let state = Arc::new(AppState { relay });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    tracing::info!("SNAPI bot stopped");
    Ok(())
}

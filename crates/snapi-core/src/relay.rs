//! Turns inbound updates into API calls and screen renders.

use std::sync::Arc;

use crate::{
    api::SnapiApi,
    domain::{MessageRef, Sender},
    messaging::{
        port::MessagingPort,
        types::{CallbackQuery, Command, IncomingUpdate, OutgoingMessage},
    },
    screens::{self, AboutInfo, Action, Screen},
    Result,
};

/// Stateless per-update handler shared by all chats.
pub struct Relay {
    api: Arc<dyn SnapiApi>,
    messenger: Arc<dyn MessagingPort>,
    about: AboutInfo,
}

impl Relay {
    pub fn new(api: Arc<dyn SnapiApi>, messenger: Arc<dyn MessagingPort>, about: AboutInfo) -> Self {
        Self {
            api,
            messenger,
            about,
        }
    }

    pub async fn handle(&self, update: IncomingUpdate) -> Result<()> {
        match update {
            IncomingUpdate::Command(cmd) => self.handle_command(cmd).await,
            IncomingUpdate::Callback(q) => self.handle_callback(q).await,
        }
    }

    async fn handle_command(&self, cmd: Command) -> Result<()> {
        match cmd.name.as_str() {
            "start" => {
                self.messenger
                    .send_message(cmd.chat_id, &screens::home(&cmd.sender))
                    .await?;
            }
            other => {
                tracing::debug!(command = other, "ignoring unknown command");
            }
        }
        Ok(())
    }

    async fn handle_callback(&self, q: CallbackQuery) -> Result<()> {
        let action = Action::from_token(&q.data);

        // Always answer the callback so the client stops its spinner.
        if let Err(e) = self
            .messenger
            .answer_callback_query(&q.callback_id, action.and_then(Action::toast))
            .await
        {
            tracing::warn!(error = %e, "failed to answer callback query");
        }

        let Some(action) = action else {
            tracing::debug!(data = %q.data, "ignoring unknown callback token");
            return Ok(());
        };
        let Some(target) = q.message else {
            return Ok(());
        };

        self.show(target, action.target(), &q.sender).await
    }

    /// Render `screen` into `target`, calling the API first for data screens.
    pub async fn show(&self, target: MessageRef, screen: Screen, sender: &Sender) -> Result<()> {
        let msg = match screen.operation(sender) {
            Some(op) => {
                self.edit_best_effort(target, &screens::loading(screen, sender))
                    .await;
                let result = self.api.call(op).await;
                screens::result(screen, sender, &result)
            }
            None if screen == Screen::About => screens::about(&self.about),
            None => screens::home(sender),
        };

        self.messenger.edit_message(target, &msg).await
    }

    async fn edit_best_effort(&self, target: MessageRef, msg: &OutgoingMessage) {
        if let Err(e) = self.messenger.edit_message(target, msg).await {
            tracing::warn!(error = %e, "failed to show progress screen");
        }
    }
}

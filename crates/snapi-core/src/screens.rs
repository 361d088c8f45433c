//! Screen rendering: pure functions from (screen, result, sender) to text + menu.
//!
//! Navigation is a star: every screen returns to [`Screen::Home`], and home
//! offers the four entry points. Nothing is remembered between renders.

use crate::{
    api::{NormalizedResult, Operation, Status},
    config::Config,
    domain::Sender,
    formatting::{escape_html, json_pre_block},
    messaging::types::{InlineButton, InlineKeyboard, OutgoingMessage, TextFormat},
};

const UNKNOWN_ERROR: &str = "unknown error";

/// Menu selections, identified on the wire by fixed callback tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    CheckMyDialog,
    ApiInfo,
    UsageStats,
    Info,
    BackToStart,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::CheckMyDialog,
        Action::ApiInfo,
        Action::UsageStats,
        Action::Info,
        Action::BackToStart,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Action::CheckMyDialog => "check_my_dialog",
            Action::ApiInfo => "api_info",
            Action::UsageStats => "usage_stats",
            Action::Info => "info",
            Action::BackToStart => "back_to_start",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.token() == token)
    }

    pub fn target(self) -> Screen {
        match self {
            Action::CheckMyDialog => Screen::CheckDialog,
            Action::ApiInfo => Screen::ApiInfo,
            Action::UsageStats => Screen::UsageStats,
            Action::Info => Screen::About,
            Action::BackToStart => Screen::Home,
        }
    }

    /// Short acknowledgement shown by the client when the button is pressed.
    pub fn toast(self) -> Option<&'static str> {
        match self {
            Action::CheckMyDialog => Some("🔍 Checking..."),
            Action::ApiInfo => Some("ℹ️ Requesting API information..."),
            Action::UsageStats => Some("📊 Requesting statistics..."),
            Action::Info | Action::BackToStart => None,
        }
    }

    fn button(self, label: &str) -> InlineButton {
        InlineButton::new(label, self.token())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Home,
    CheckDialog,
    ApiInfo,
    UsageStats,
    About,
}

impl Screen {
    /// The API call behind a data screen; `None` for static screens.
    pub fn operation(self, sender: &Sender) -> Option<Operation> {
        match self {
            Screen::CheckDialog => Some(Operation::CheckDialog(sender.user_id)),
            Screen::ApiInfo => Some(Operation::ApiInfo),
            Screen::UsageStats => Some(Operation::UsageStats),
            Screen::Home | Screen::About => None,
        }
    }

    /// The action that re-runs this screen's request; `None` for screens
    /// rendered without the API.
    fn retry_action(self) -> Option<Action> {
        match self {
            Screen::CheckDialog => Some(Action::CheckMyDialog),
            Screen::ApiInfo => Some(Action::ApiInfo),
            Screen::UsageStats => Some(Action::UsageStats),
            Screen::Home | Screen::About => None,
        }
    }

    fn title(self) -> &'static str {
        match self {
            Screen::Home => "🤖 SNAPI test bot",
            Screen::CheckDialog => "🔍 Dialog check",
            Screen::ApiInfo => "ℹ️ API information",
            Screen::UsageStats => "📊 API statistics",
            Screen::About => "ℹ️ About the bot",
        }
    }
}

/// Three-way status marker on result screens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    Success,
    NotFound,
    Error,
}

impl Marker {
    pub fn emoji(self) -> &'static str {
        match self {
            Marker::Success => "✅",
            Marker::NotFound => "❌",
            Marker::Error => "⚠️",
        }
    }
}

/// What a result screen says about a call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub marker: Marker,
    pub status_text: &'static str,
    pub description: String,
}

/// Static facts shown on the about screen.
#[derive(Clone, Debug)]
pub struct AboutInfo {
    pub api_url: String,
    pub api_key_preview: String,
}

impl From<&Config> for AboutInfo {
    fn from(cfg: &Config) -> Self {
        Self {
            api_url: cfg.snapi_url.clone(),
            api_key_preview: cfg.api_key_preview(),
        }
    }
}

pub fn home(sender: &Sender) -> OutgoingMessage {
    let text = format!(
        "{}\n\n👋 Hello, {}!\n\n🎯 This bot works with the SNAPI API\n\n📱 Your ID: {}",
        Screen::Home.title(),
        sender.first_name,
        sender.user_id.0
    );

    OutgoingMessage {
        text,
        format: TextFormat::Plain,
        keyboard: InlineKeyboard::new(vec![
            Action::CheckMyDialog.button("🔍 Check my dialog"),
            Action::UsageStats.button("📊 API statistics"),
            Action::ApiInfo.button("ℹ️ API information"),
            Action::Info.button("ℹ️ About the bot"),
        ]),
    }
}

pub fn about(info: &AboutInfo) -> OutgoingMessage {
    let text = format!(
        "{}\n\n\
         🤖 Purpose: testing the SNAPI API\n\
         🔗 API URL: {}\n\
         🔑 API Key: {}\n\n\
         🎯 What the bot does:\n\
         • Connects to the SNAPI API\n\
         • Checks user dialogs\n\
         • Requests API information\n\
         • Shows usage statistics\n\n\
         💡 How to use:\n\
         1. Pick an action from the menu\n\
         2. The bot sends a request to SNAPI\n\
         3. Get the result",
        Screen::About.title(),
        escape_html(&info.api_url),
        escape_html(&info.api_key_preview),
    );

    OutgoingMessage {
        text,
        format: TextFormat::Html,
        keyboard: InlineKeyboard::new(vec![Action::BackToStart.button("🔙 Back")]),
    }
}

/// Interim screen shown while a data screen waits for the API.
pub fn loading(screen: Screen, sender: &Sender) -> OutgoingMessage {
    let mut text = format!("{}\n\n", screen.title());
    if screen == Screen::CheckDialog {
        text.push_str(&format!("👤 User ID: {}\n", sender.user_id.0));
    }
    text.push_str("⏳ Sending request to SNAPI...");

    OutgoingMessage {
        text,
        format: TextFormat::Plain,
        keyboard: InlineKeyboard::default(),
    }
}

/// Classify a result for the given data screen.
pub fn verdict(screen: Screen, result: &NormalizedResult) -> Verdict {
    let error = || Verdict {
        marker: Marker::Error,
        status_text: "error",
        description: result
            .message
            .clone()
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
    };

    match screen {
        Screen::CheckDialog => match result.status {
            Status::Found => Verdict {
                marker: Marker::Success,
                status_text: "dialog found",
                description: "you have interacted with the main bot".to_string(),
            },
            Status::NotFound => Verdict {
                marker: Marker::NotFound,
                status_text: "dialog not found",
                description: "you have not interacted with the main bot yet".to_string(),
            },
            _ => error(),
        },
        _ if result.is_error() => error(),
        Screen::UsageStats => Verdict {
            marker: Marker::Success,
            status_text: "statistics received",
            description: result
                .message
                .clone()
                .unwrap_or_else(|| "API usage statistics".to_string()),
        },
        _ => Verdict {
            marker: Marker::Success,
            status_text: "information received",
            description: result
                .message
                .clone()
                .unwrap_or_else(|| "API information received".to_string()),
        },
    }
}

/// Result screen for a data screen: status line, description, verbatim dump, retry + home.
pub fn result(screen: Screen, sender: &Sender, result: &NormalizedResult) -> OutgoingMessage {
    debug_assert!(
        screen.operation(sender).is_some(),
        "result screen requested for {screen:?}"
    );
    let v = verdict(screen, result);

    let (header, retry_label) = match screen {
        Screen::CheckDialog => (
            format!("🔍 Check result\n\n👤 User ID: {}\n", sender.user_id.0),
            "🔄 Check again",
        ),
        other => (format!("{}\n\n", other.title()), "🔄 Request again"),
    };

    let text = format!(
        "{header}{} Status: {}\n📝 Description: {}\n\n🔧 Technical details:\n{}",
        v.marker.emoji(),
        v.status_text,
        escape_html(&v.description),
        json_pre_block(&result.diagnostic()),
    );

    OutgoingMessage {
        text,
        format: TextFormat::Html,
        keyboard: InlineKeyboard::new(
            screen
                .retry_action()
                .map(|retry| retry.button(retry_label))
                .into_iter()
                .chain([Action::BackToStart.button("🏠 Menu")])
                .collect(),
        ),
    }
}

//! Core of the SNAPI relay bot.
//!
//! This crate is framework-agnostic. Telegram lives behind the messaging port
//! (implemented in `snapi-telegram`); SNAPI lives behind [`api::SnapiApi`].

pub mod api;
pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod relay;
pub mod screens;

pub use errors::{Error, Result};

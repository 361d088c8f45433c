//! Outbound SNAPI calls.
//!
//! Every call ends in a [`NormalizedResult`]; transport and protocol faults are
//! converted to data at this boundary and never reach the caller as errors.

use async_trait::async_trait;

use crate::domain::UserId;

pub mod client;
pub mod result;

pub use client::SnapiClient;
pub use result::{ApiError, NormalizedResult, Status};

/// The three fixed requests the bot can make.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    CheckDialog(UserId),
    ApiInfo,
    UsageStats,
}

impl Operation {
    /// Path segment under the configured base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Operation::CheckDialog(_) => "check-dialog",
            Operation::ApiInfo => "api-info",
            Operation::UsageStats => "usage-stats",
        }
    }
}

/// Port for the external statistics/dialog API.
#[async_trait]
pub trait SnapiApi: Send + Sync {
    async fn call(&self, op: Operation) -> NormalizedResult;
}

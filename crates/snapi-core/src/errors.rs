/// Core error type for the relay.
///
/// Adapter crates map their specific errors into this type so the bot core can
/// handle failures consistently. Outbound API faults never surface here: the
/// API client turns them into [`crate::api::NormalizedResult`] values.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;

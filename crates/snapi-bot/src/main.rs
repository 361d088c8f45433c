use std::sync::Arc;

use snapi_core::{api::SnapiClient, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    snapi_core::logging::init("snapi-bot")?;

    if let Err(e) = run().await {
        tracing::error!(error = %format!("{e:#}"), "bot failed to start");
        return Err(e);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let cfg = Arc::new(Config::load()?);
    let api = Arc::new(SnapiClient::from_config(&cfg)?);

    snapi_telegram::router::run_polling(cfg, api).await
}

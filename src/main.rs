//! Medscreen: multi-model medical screening inference service.
//!
//! Main entry point.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use medscreen::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting medscreen...");

    let config = Config::from_env()?;
    medscreen::server::serve(config).await?;

    tracing::info!("Medscreen shutdown complete.");
    Ok(())
}

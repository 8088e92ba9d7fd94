mod bot;
mod config;
mod dispatch;
mod handlers;
mod sender;
mod strings;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bot::BotService;
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,minibot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mode = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "polling".to_string());
    let config_path = std::env::args()
        .nth(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let service = BotService::new(config)?;

    match mode.as_str() {
        "polling" => service.run_polling().await,
        "webhook" => service.run_webhook().await,
        other => bail!("Unknown mode '{}', expected 'polling' or 'webhook'", other),
    }
}

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::strings::Locale;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub general: GeneralConfig,
    /// Accepted for compatibility; no database client is constructed.
    #[serde(default)]
    pub storage: Option<StorageConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebhookConfig {
    /// Public base URL the platform should push updates to. The bot token is
    /// appended as the final path segment when registering.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    /// IANA zone name used by /time; unknown names fall back to UTC.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub locale: Locale,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            locale: Locale::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub mongo_url: String,
    pub db_name: String,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }
}

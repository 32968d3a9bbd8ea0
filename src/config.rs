use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use url::Url;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub miniapp: MiniAppConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Timeout for individual Telegram API calls, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Where the embedded mini-app lives and how its launch button is labeled.
#[derive(Debug, Deserialize, Clone)]
pub struct MiniAppConfig {
    /// Deployment-specific; deserializing enforces URL shape and nothing
    /// else. The bot never fetches it, clients do.
    pub url: Url,
    #[serde(default = "default_button_label")]
    pub button_label: String,
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_button_label() -> String {
    "🚕 Order a taxi".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if config.telegram.bot_token.trim().is_empty() {
            bail!("telegram.bot_token is empty in {}", path.display());
        }

        Ok(config)
    }
}

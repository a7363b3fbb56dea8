use eyre::{Result, WrapErr};
use serde::Deserialize;
use std::env;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Configuration for talking to the messaging platform.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Base URL of the bot API, without a trailing slash
    pub api_base_url: String,
    /// Per-request timeout for outbound calls, in seconds
    pub request_timeout_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE.to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl BotConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let api_base_url = env::var("TELEGRAM_API_BASE")
            .unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

        let request_timeout_secs = env::var("CHAT_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .wrap_err("CHAT_REQUEST_TIMEOUT_SECONDS must be a whole number of seconds")?;

        Ok(Self {
            api_base_url,
            request_timeout_secs,
        })
    }

    /// The API base with any trailing slash removed.
    pub fn api_base(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}

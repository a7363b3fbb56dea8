use std::time::Duration;

use async_trait::async_trait;
use eyre::{Result, WrapErr, eyre};
use serde::Serialize;
use tracing::debug;

use crate::config::BotConfig;

/// Sends a text message to a chat through a bot credential.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_message(&self, credential: &str, chat_id: &str, text: &str) -> Result<()>;
}

/// Chat ids travel as numbers when they look numeric, otherwise as strings
/// (channel usernames such as `@pillbox`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChatId<'a> {
    Numeric(i64),
    Text(&'a str),
}

impl<'a> From<&'a str> for ChatId<'a> {
    fn from(value: &'a str) -> Self {
        value
            .trim()
            .parse::<i64>()
            .map(ChatId::Numeric)
            .unwrap_or(ChatId::Text(value))
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: ChatId<'a>,
    text: &'a str,
}

/// Bot API client over HTTPS.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    api_base: String,
}

impl TelegramClient {
    pub fn new(config: &BotConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .wrap_err("Failed to build HTTP client")?;

        Ok(Self {
            http,
            api_base: config.api_base().to_string(),
        })
    }

    fn api_url(&self, credential: &str, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, credential, method)
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_message(&self, credential: &str, chat_id: &str, text: &str) -> Result<()> {
        let body = SendMessage {
            chat_id: ChatId::from(chat_id),
            text,
        };

        // The credential is part of the URL, so strip it from transport errors.
        let response = self
            .http
            .post(self.api_url(credential, "sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| eyre!("sendMessage request failed: {}", e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(eyre!("sendMessage returned {}: {}", status, detail));
        }

        debug!(chat_id, "Chat message delivered");
        Ok(())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A messaging-platform bot registered by a user.
///
/// At most one binding per user is active; the chat id stays empty until the
/// account-linking handshake completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotBinding {
    pub id: Uuid,
    pub user_id: String,
    #[serde(skip_serializing)]
    pub bot_token: String,
    pub bot_username: String,
    pub chat_id: Option<String>,
    pub chat_handle: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl BotBinding {
    /// Credential, if non-blank.
    pub fn credential(&self) -> Option<&str> {
        Some(self.bot_token.trim()).filter(|t| !t.is_empty())
    }

    pub fn bound_chat_id(&self) -> Option<&str> {
        self.chat_id.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

/// Denormalised per-user fields the dispatch path reads without a join.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: String,
    pub active_bot_id: Option<Uuid>,
    #[serde(skip_serializing)]
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl UserSummary {
    /// Top-level credential kept from before bindings existed.
    pub fn legacy_credential(&self) -> Option<&str> {
        self.telegram_bot_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBotBindingRequest {
    pub bot_token: String,
    pub bot_username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotBindingResponse {
    pub id: Uuid,
    pub bot_username: String,
    pub chat_id: Option<String>,
    pub chat_handle: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl From<BotBinding> for BotBindingResponse {
    fn from(binding: BotBinding) -> Self {
        Self {
            id: binding.id,
            bot_username: binding.bot_username,
            chat_id: binding.chat_id,
            chat_handle: binding.chat_handle,
            created_at: binding.created_at,
            is_active: binding.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepLinkResponse {
    pub bot_id: Uuid,
    pub url: String,
}

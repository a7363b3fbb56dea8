use std::sync::Arc;

use eyre::Result;
use tracing::{debug, info, warn};
use uuid::Uuid;
use vitalog_core::models::reminder::Reminder;
use vitalog_db::repositories::BotRepository;
use vitalog_telegram_bot::ChatTransport;

use super::{Channel, DispatchOutcome, SkipReason};

/// Credential and destination a chat message goes out with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCredential {
    /// The user's active bot binding, linked through the handshake.
    ActiveBinding {
        binding_id: Uuid,
        token: String,
        chat_id: String,
    },
    /// Top-level credential from before bindings existed, paired with the
    /// reminder's own chat id.
    Legacy { token: String, chat_id: String },
}

impl ChatCredential {
    pub fn token(&self) -> &str {
        match self {
            ChatCredential::ActiveBinding { token, .. } | ChatCredential::Legacy { token, .. } => token,
        }
    }

    pub fn chat_id(&self) -> &str {
        match self {
            ChatCredential::ActiveBinding { chat_id, .. } | ChatCredential::Legacy { chat_id, .. } => chat_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialResolution {
    Resolved(ChatCredential),
    Unavailable(SkipReason),
}

/// Picks the credential for a reminder's chat delivery.
///
/// An active binding wins outright: if it is incomplete the reminder is
/// skipped rather than falling back to the legacy credential.
pub async fn resolve_credential(bots: &dyn BotRepository, reminder: &Reminder) -> Result<CredentialResolution> {
    let summary = bots.get_user_summary(&reminder.user_id).await?.unwrap_or_default();

    if let Some(binding_id) = summary.active_bot_id {
        let Some(binding) = bots.get_bot_binding(binding_id).await? else {
            return Ok(CredentialResolution::Unavailable(SkipReason::BindingMissing));
        };
        return Ok(match (binding.credential(), binding.bound_chat_id()) {
            (Some(token), Some(chat_id)) => CredentialResolution::Resolved(ChatCredential::ActiveBinding {
                binding_id,
                token: token.to_string(),
                chat_id: chat_id.to_string(),
            }),
            _ => CredentialResolution::Unavailable(SkipReason::BindingIncomplete),
        });
    }

    if let Some(token) = summary.legacy_credential() {
        return Ok(match reminder.chat_id() {
            Some(chat_id) => CredentialResolution::Resolved(ChatCredential::Legacy {
                token: token.to_string(),
                chat_id: chat_id.to_string(),
            }),
            None => CredentialResolution::Unavailable(SkipReason::NoChatId),
        });
    }

    Ok(CredentialResolution::Unavailable(SkipReason::NoCredential))
}

pub fn render_reminder_text(reminder: &Reminder) -> String {
    format!(
        "Medication reminder: time to take {} ({}).",
        reminder.name,
        reminder.time_label()
    )
}

pub struct ChatDispatcher {
    bots: Arc<dyn BotRepository>,
    transport: Arc<dyn ChatTransport>,
}

impl ChatDispatcher {
    pub fn new(bots: Arc<dyn BotRepository>, transport: Arc<dyn ChatTransport>) -> Self {
        Self { bots, transport }
    }

    pub async fn dispatch(&self, reminder: &Reminder) -> DispatchOutcome {
        if !reminder.telegram_notifications_enabled {
            return DispatchOutcome::Skipped(SkipReason::ChatDisabled);
        }

        let credential = match resolve_credential(self.bots.as_ref(), reminder).await {
            Ok(CredentialResolution::Resolved(credential)) => credential,
            Ok(CredentialResolution::Unavailable(reason)) => {
                info!(
                    reminder_id = %reminder.id,
                    user_id = %reminder.user_id,
                    channel = %Channel::Chat,
                    ?reason,
                    "No chat credential available, skipping"
                );
                return DispatchOutcome::Skipped(reason);
            }
            Err(e) => {
                warn!(reminder_id = %reminder.id, channel = %Channel::Chat, error = %e, "Credential lookup failed");
                return DispatchOutcome::Failed(e.to_string());
            }
        };

        if let ChatCredential::ActiveBinding { binding_id, .. } = &credential {
            debug!(reminder_id = %reminder.id, %binding_id, "Using active bot binding");
        }

        let text = render_reminder_text(reminder);
        match self
            .transport
            .send_message(credential.token(), credential.chat_id(), &text)
            .await
        {
            Ok(()) => {
                info!(reminder_id = %reminder.id, channel = %Channel::Chat, "Reminder chat message sent");
                DispatchOutcome::Sent
            }
            Err(e) => {
                warn!(reminder_id = %reminder.id, channel = %Channel::Chat, error = %e, "Reminder chat message failed");
                DispatchOutcome::Failed(e.to_string())
            }
        }
    }
}

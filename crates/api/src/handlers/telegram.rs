//! Inbound webhook for the messaging platform.
//!
//! The only command acted on is `/start <userId>_<credentialPrefix>`, which
//! links the chat it arrives from to the user's active bot binding. The
//! prefix check is a lightweight authenticity test, not a shared secret.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
};
use tracing::{debug, info, warn};
use vitalog_core::errors::HealthError;
use vitalog_db::repositories::BotRepository;
use vitalog_telegram_bot::{
    ChatTransport,
    update::{StartPayload, Update, parse_start},
};

use crate::{ApiState, middleware::error_handling::AppError};

pub const LINKED_CONFIRMATION: &str =
    "Your chat is now linked. Medication reminders will be delivered here.";

pub async fn inbound_update(
    State(state): State<Arc<ApiState>>,
    method: Method,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    handle_inbound_update(state.bots.as_ref(), state.chat.as_ref(), &method, &body).await
}

/// Runs the linking handshake for one webhook call.
///
/// Replaying the same update rewrites the same chat id, so repeats are safe.
pub async fn handle_inbound_update(
    bots: &dyn BotRepository,
    chat: &dyn ChatTransport,
    method: &Method,
    body: &[u8],
) -> Result<StatusCode, AppError> {
    if *method != Method::POST {
        return Err(HealthError::Protocol(format!("webhook does not accept {}", method)).into());
    }

    let update: Update = serde_json::from_slice(body)
        .map_err(|e| HealthError::Protocol(format!("malformed update: {}", e)))?;

    let (Some(text), Some(from_chat)) = (update.text(), update.chat()) else {
        debug!("Ignoring update without a text message");
        return Ok(StatusCode::OK);
    };

    let (user_id, credential_prefix) = match parse_start(text) {
        StartPayload::NotStart => return Ok(StatusCode::OK),
        StartPayload::Incomplete => {
            return Err(HealthError::Protocol(
                "start command must carry <userId>_<credentialPrefix>".to_string(),
            )
            .into());
        }
        StartPayload::Link {
            user_id,
            credential_prefix,
        } => (user_id, credential_prefix),
    };

    let bot_id = bots
        .get_user_summary(&user_id)
        .await?
        .and_then(|summary| summary.active_bot_id)
        .ok_or_else(|| HealthError::Protocol("bot not found".to_string()))?;

    let binding = bots
        .get_bot_binding(bot_id)
        .await?
        .ok_or_else(|| HealthError::Protocol("bot not found".to_string()))?;

    if !binding.bot_token.starts_with(&credential_prefix) {
        warn!(%user_id, %bot_id, "Start command credential prefix mismatch");
        return Err(HealthError::Protocol("credential prefix mismatch".to_string()).into());
    }

    let chat_id = from_chat.id.to_string();
    bots.bind_chat(&user_id, bot_id, &chat_id, from_chat.display_handle())
        .await?;
    info!(%user_id, %bot_id, %chat_id, "Chat linked to bot binding");

    // The link is already stored; a failed confirmation does not undo it.
    if let Err(e) = chat
        .send_message(&binding.bot_token, &chat_id, LINKED_CONFIRMATION)
        .await
    {
        warn!(%user_id, %bot_id, error = %e, "Failed to send link confirmation");
    }

    Ok(StatusCode::OK)
}

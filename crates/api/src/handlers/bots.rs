use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;
use uuid::Uuid;
use vitalog_core::{
    errors::HealthError,
    models::bot::{BotBindingResponse, CreateBotBindingRequest, DeepLinkResponse},
};
use vitalog_telegram_bot::link::linking_deep_link;

use crate::{ApiState, middleware::error_handling::AppError};

pub async fn list_bots(
    State(state): State<Arc<ApiState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<BotBindingResponse>>, AppError> {
    let bindings = state.bots.list_bot_bindings(&user_id).await?;

    Ok(Json(bindings.into_iter().map(Into::into).collect()))
}

pub async fn create_bot(
    State(state): State<Arc<ApiState>>,
    Path(user_id): Path<String>,
    Json(payload): Json<CreateBotBindingRequest>,
) -> Result<(StatusCode, Json<BotBindingResponse>), AppError> {
    let token = payload.bot_token.trim();
    let username = payload.bot_username.trim().trim_start_matches('@');
    if token.is_empty() {
        return Err(HealthError::Validation("bot_token must not be empty".to_string()).into());
    }
    if username.is_empty() {
        return Err(HealthError::Validation("bot_username must not be empty".to_string()).into());
    }

    let binding = state.bots.create_bot_binding(&user_id, token, username).await?;
    info!(%user_id, bot_id = %binding.id, "Bot binding created");

    Ok((StatusCode::CREATED, Json(binding.into())))
}

pub async fn activate_bot(
    State(state): State<Arc<ApiState>>,
    Path((user_id, id)): Path<(String, Uuid)>,
) -> Result<Json<BotBindingResponse>, AppError> {
    let binding = state
        .bots
        .activate_bot_binding(&user_id, id)
        .await?
        .ok_or_else(|| HealthError::NotFound(format!("Bot with ID {} not found", id)))?;

    Ok(Json(binding.into()))
}

pub async fn delete_bot(
    State(state): State<Arc<ApiState>>,
    Path((user_id, id)): Path<(String, Uuid)>,
) -> Result<StatusCode, AppError> {
    if !state.bots.delete_bot_binding(&user_id, id).await? {
        return Err(HealthError::NotFound(format!("Bot with ID {} not found", id)).into());
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Deep link for the user's active bot, carrying the credential prefix the
/// `/start` handshake checks.
pub async fn bot_link(
    State(state): State<Arc<ApiState>>,
    Path(user_id): Path<String>,
) -> Result<Json<DeepLinkResponse>, AppError> {
    let not_found = || HealthError::NotFound(format!("No active bot for user {}", user_id));

    let bot_id = state
        .bots
        .get_user_summary(&user_id)
        .await?
        .and_then(|summary| summary.active_bot_id)
        .ok_or_else(not_found)?;
    let binding = state.bots.get_bot_binding(bot_id).await?.ok_or_else(not_found)?;

    Ok(Json(DeepLinkResponse {
        bot_id,
        url: linking_deep_link(&binding.bot_username, &user_id, &binding.bot_token),
    }))
}

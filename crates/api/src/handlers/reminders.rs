use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::warn;
use uuid::Uuid;
use vitalog_core::{
    errors::HealthError,
    models::reminder::{CreateReminderRequest, Reminder},
};
use vitalog_db::models::NewReminder;

use crate::{ApiState, middleware::error_handling::AppError};

pub async fn list_reminders(
    State(state): State<Arc<ApiState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Reminder>>, AppError> {
    let rows = state.reminders.list_for_user(&user_id).await?;

    // A malformed row should not hide the user's other reminders
    let reminders = rows
        .into_iter()
        .filter_map(|row| match Reminder::try_from(row) {
            Ok(reminder) => Some(reminder),
            Err(e) => {
                warn!(%user_id, error = %e, "Skipping invalid reminder record");
                None
            }
        })
        .collect();

    Ok(Json(reminders))
}

pub async fn create_reminder(
    State(state): State<Arc<ApiState>>,
    Path(user_id): Path<String>,
    Json(payload): Json<CreateReminderRequest>,
) -> Result<(StatusCode, Json<Reminder>), AppError> {
    let new_reminder = NewReminder::from_request(&user_id, payload)?;
    let row = state.reminders.create(&new_reminder).await?;

    Ok((StatusCode::CREATED, Json(Reminder::try_from(row)?)))
}

pub async fn delete_reminder(
    State(state): State<Arc<ApiState>>,
    Path((user_id, id)): Path<(String, Uuid)>,
) -> Result<StatusCode, AppError> {
    if !state.reminders.delete(&user_id, id).await? {
        return Err(HealthError::NotFound(format!("Reminder with ID {} not found", id)).into());
    }

    Ok(StatusCode::NO_CONTENT)
}

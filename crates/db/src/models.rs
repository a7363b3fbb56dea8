use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use vitalog_core::{
    errors::HealthError,
    models::{
        bot::{BotBinding, UserSummary},
        reminder::{CreateReminderRequest, Reminder, Schedule, parse_time_of_day},
    },
};

/// A reminder row exactly as stored; decode with `Reminder::try_from`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DbReminder {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub frequency: String,
    pub time: String,
    pub days_of_week: Vec<String>,
    pub specific_date: Option<NaiveDate>,
    pub email: Option<String>,
    pub notifications_enabled: bool,
    pub telegram_notifications_enabled: bool,
    pub telegram_chat_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbReminder> for Reminder {
    type Error = HealthError;

    fn try_from(row: DbReminder) -> Result<Self, Self::Error> {
        let id = row.id;
        let tag = |err: HealthError| match err {
            HealthError::Data(message) => HealthError::Data(format!("reminder {}: {}", id, message)),
            other => other,
        };
        let schedule =
            Schedule::from_parts(&row.frequency, &row.days_of_week, row.specific_date)
                .map_err(tag)?;
        let time = parse_time_of_day(&row.time).map_err(tag)?;

        Ok(Reminder {
            id,
            name: row.name,
            schedule,
            time,
            user_id: row.user_id,
            created_at: row.created_at,
            email: row.email,
            notifications_enabled: row.notifications_enabled,
            telegram_notifications_enabled: row.telegram_notifications_enabled,
            telegram_chat_id: row.telegram_chat_id,
        })
    }
}

/// Fields for inserting a reminder that has already been validated.
#[derive(Debug, Clone)]
pub struct NewReminder {
    pub user_id: String,
    pub name: String,
    pub schedule: Schedule,
    pub time: String,
    pub email: Option<String>,
    pub notifications_enabled: bool,
    pub telegram_notifications_enabled: bool,
    pub telegram_chat_id: Option<String>,
}

impl NewReminder {
    /// Validates a create request and normalises its time to `HH:MM`.
    pub fn from_request(user_id: &str, request: CreateReminderRequest) -> Result<Self, HealthError> {
        let (schedule, time) = request.validate()?;
        Ok(Self {
            user_id: user_id.to_string(),
            name: request.name.trim().to_string(),
            schedule,
            time: time.format("%H:%M").to_string(),
            email: request.email.filter(|e| !e.trim().is_empty()),
            notifications_enabled: request.notifications_enabled,
            telegram_notifications_enabled: request.telegram_notifications_enabled,
            telegram_chat_id: request.telegram_chat_id.filter(|c| !c.trim().is_empty()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DbBotBinding {
    pub id: Uuid,
    pub user_id: String,
    pub bot_token: String,
    pub bot_username: String,
    pub chat_id: Option<String>,
    pub chat_handle: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl From<DbBotBinding> for BotBinding {
    fn from(row: DbBotBinding) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            bot_token: row.bot_token,
            bot_username: row.bot_username,
            chat_id: row.chat_id,
            chat_handle: row.chat_handle,
            created_at: row.created_at,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DbUserSummary {
    pub user_id: String,
    pub active_bot_id: Option<Uuid>,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl From<DbUserSummary> for UserSummary {
    fn from(row: DbUserSummary) -> Self {
        Self {
            user_id: row.user_id,
            active_bot_id: row.active_bot_id,
            telegram_bot_token: row.telegram_bot_token,
            telegram_chat_id: row.telegram_chat_id,
        }
    }
}

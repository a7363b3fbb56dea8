#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use fake::{Fake, faker::internet::en::Username};
use uuid::Uuid;
use vitalog_db::models::{DbBotBinding, DbReminder, DbUserSummary};

/// Monday 2024-01-01 09:02, inside the window of a 09:00 reminder.
pub fn monday_morning() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(9, 2, 0)
        .unwrap()
}

pub fn daily_reminder(user_id: &str, name: &str, time: &str) -> DbReminder {
    DbReminder {
        id: Uuid::new_v4(),
        user_id: user_id.to_string(),
        name: name.to_string(),
        frequency: "daily".to_string(),
        time: time.to_string(),
        days_of_week: Vec::new(),
        specific_date: None,
        email: Some(format!("{}@example.com", name.to_lowercase())),
        notifications_enabled: true,
        telegram_notifications_enabled: true,
        telegram_chat_id: Some("4242".to_string()),
        created_at: Utc.with_ymd_and_hms(2023, 12, 1, 8, 0, 0).unwrap(),
    }
}

pub fn binding(user_id: &str, token: &str, chat_id: Option<&str>) -> DbBotBinding {
    DbBotBinding {
        id: Uuid::new_v4(),
        user_id: user_id.to_string(),
        bot_token: token.to_string(),
        bot_username: Username().fake(),
        chat_id: chat_id.map(str::to_string),
        chat_handle: None,
        created_at: Utc::now(),
        is_active: true,
    }
}

pub fn summary(user_id: &str, active_bot_id: Option<Uuid>, legacy_token: Option<&str>) -> DbUserSummary {
    DbUserSummary {
        user_id: user_id.to_string(),
        active_bot_id,
        telegram_bot_token: legacy_token.map(str::to_string),
        telegram_chat_id: None,
    }
}

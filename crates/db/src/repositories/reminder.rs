use crate::models::{DbReminder, NewReminder};
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

const REMINDER_COLUMNS: &str = r#"
    id, user_id, name, frequency, time, days_of_week, specific_date, email,
    notifications_enabled, telegram_notifications_enabled, telegram_chat_id, created_at
"#;

pub async fn create_reminder(pool: &Pool<Postgres>, reminder: &NewReminder) -> Result<DbReminder> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let query = format!(
        r#"
        INSERT INTO reminders (
            id, user_id, name, frequency, time, days_of_week, specific_date, email,
            notifications_enabled, telegram_notifications_enabled, telegram_chat_id, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING {REMINDER_COLUMNS}
        "#
    );

    let created = sqlx::query_as::<_, DbReminder>(&query)
        .bind(id)
        .bind(&reminder.user_id)
        .bind(&reminder.name)
        .bind(reminder.schedule.frequency())
        .bind(&reminder.time)
        .bind(reminder.schedule.day_names())
        .bind(reminder.schedule.specific_date())
        .bind(&reminder.email)
        .bind(reminder.notifications_enabled)
        .bind(reminder.telegram_notifications_enabled)
        .bind(&reminder.telegram_chat_id)
        .bind(now)
        .fetch_one(pool)
        .await?;

    Ok(created)
}

pub async fn get_all_reminders(pool: &Pool<Postgres>) -> Result<Vec<DbReminder>> {
    let query = format!("SELECT {REMINDER_COLUMNS} FROM reminders");

    let reminders = sqlx::query_as::<_, DbReminder>(&query)
        .fetch_all(pool)
        .await?;

    Ok(reminders)
}

pub async fn get_reminders_by_user(pool: &Pool<Postgres>, user_id: &str) -> Result<Vec<DbReminder>> {
    let query = format!(
        r#"
        SELECT {REMINDER_COLUMNS}
        FROM reminders
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#
    );

    let reminders = sqlx::query_as::<_, DbReminder>(&query)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(reminders)
}

pub async fn delete_reminder(pool: &Pool<Postgres>, user_id: &str, id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM reminders
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

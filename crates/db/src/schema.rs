use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create reminders table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reminders (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id VARCHAR(255) NOT NULL,
            name VARCHAR(255) NOT NULL,
            frequency VARCHAR(32) NOT NULL,
            time VARCHAR(5) NOT NULL,
            days_of_week TEXT[] NOT NULL DEFAULT '{}',
            specific_date DATE NULL,
            email VARCHAR(320) NULL,
            notifications_enabled BOOLEAN NOT NULL DEFAULT TRUE,
            telegram_notifications_enabled BOOLEAN NOT NULL DEFAULT FALSE,
            telegram_chat_id VARCHAR(64) NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create bot_bindings table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bot_bindings (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id VARCHAR(255) NOT NULL,
            bot_token VARCHAR(255) NOT NULL,
            bot_username VARCHAR(255) NOT NULL,
            chat_id VARCHAR(64) NULL,
            chat_handle VARCHAR(255) NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            is_active BOOLEAN NOT NULL DEFAULT FALSE
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create user_summaries table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_summaries (
            user_id VARCHAR(255) PRIMARY KEY,
            active_bot_id UUID NULL REFERENCES bot_bindings(id) ON DELETE SET NULL,
            telegram_bot_token VARCHAR(255) NULL,
            telegram_chat_id VARCHAR(64) NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_reminders_user_created ON reminders(user_id, created_at DESC)",
        "CREATE INDEX IF NOT EXISTS idx_bot_bindings_user_id ON bot_bindings(user_id)",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_bot_bindings_one_active ON bot_bindings(user_id) WHERE is_active",
    ];
    for statement in indexes {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}

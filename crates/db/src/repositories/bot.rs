use crate::models::{DbBotBinding, DbUserSummary};
use chrono::Utc;
use eyre::{Result, eyre};
use sqlx::{Pool, Postgres, Transaction};
use uuid::Uuid;

const BINDING_COLUMNS: &str =
    "id, user_id, bot_token, bot_username, chat_id, chat_handle, created_at, is_active";

// User Summary Repository

pub async fn get_user_summary(pool: &Pool<Postgres>, user_id: &str) -> Result<Option<DbUserSummary>> {
    let summary = sqlx::query_as::<_, DbUserSummary>(
        r#"
        SELECT user_id, active_bot_id, telegram_bot_token, telegram_chat_id
        FROM user_summaries
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(summary)
}

async fn mirror_active_binding(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &str,
    binding: Option<&DbBotBinding>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO user_summaries (user_id, active_bot_id, telegram_bot_token, telegram_chat_id)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id)
        DO UPDATE SET
            active_bot_id = EXCLUDED.active_bot_id,
            telegram_bot_token = EXCLUDED.telegram_bot_token,
            telegram_chat_id = EXCLUDED.telegram_chat_id
        "#,
    )
    .bind(user_id)
    .bind(binding.map(|b| b.id))
    .bind(binding.map(|b| b.bot_token.clone()))
    .bind(binding.and_then(|b| b.chat_id.clone()))
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// Bot Binding Repository

pub async fn get_bot_binding_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbBotBinding>> {
    let query = format!("SELECT {BINDING_COLUMNS} FROM bot_bindings WHERE id = $1");

    let binding = sqlx::query_as::<_, DbBotBinding>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(binding)
}

pub async fn get_bot_bindings_by_user(pool: &Pool<Postgres>, user_id: &str) -> Result<Vec<DbBotBinding>> {
    let query = format!(
        "SELECT {BINDING_COLUMNS} FROM bot_bindings WHERE user_id = $1 ORDER BY created_at DESC"
    );

    let bindings = sqlx::query_as::<_, DbBotBinding>(&query)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(bindings)
}

pub async fn create_bot_binding(
    pool: &Pool<Postgres>,
    user_id: &str,
    bot_token: &str,
    bot_username: &str,
) -> Result<DbBotBinding> {
    let id = Uuid::new_v4();
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE bot_bindings SET is_active = FALSE WHERE user_id = $1 AND is_active")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let query = format!(
        r#"
        INSERT INTO bot_bindings (id, user_id, bot_token, bot_username, chat_id, chat_handle, created_at, is_active)
        VALUES ($1, $2, $3, $4, NULL, NULL, $5, TRUE)
        RETURNING {BINDING_COLUMNS}
        "#
    );
    let binding = sqlx::query_as::<_, DbBotBinding>(&query)
        .bind(id)
        .bind(user_id)
        .bind(bot_token)
        .bind(bot_username)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

    mirror_active_binding(&mut tx, user_id, Some(&binding)).await?;
    tx.commit().await?;

    Ok(binding)
}

pub async fn activate_bot_binding(
    pool: &Pool<Postgres>,
    user_id: &str,
    id: Uuid,
) -> Result<Option<DbBotBinding>> {
    let mut tx = pool.begin().await?;

    let query = format!(
        "SELECT {BINDING_COLUMNS} FROM bot_bindings WHERE id = $1 AND user_id = $2 FOR UPDATE"
    );
    let Some(_) = sqlx::query_as::<_, DbBotBinding>(&query)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
    else {
        return Ok(None);
    };

    sqlx::query("UPDATE bot_bindings SET is_active = FALSE WHERE user_id = $1 AND is_active AND id <> $2")
        .bind(user_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let query = format!(
        "UPDATE bot_bindings SET is_active = TRUE WHERE id = $1 RETURNING {BINDING_COLUMNS}"
    );
    let binding = sqlx::query_as::<_, DbBotBinding>(&query)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

    mirror_active_binding(&mut tx, user_id, Some(&binding)).await?;
    tx.commit().await?;

    Ok(Some(binding))
}

pub async fn delete_bot_binding(pool: &Pool<Postgres>, user_id: &str, id: Uuid) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let query = format!(
        "DELETE FROM bot_bindings WHERE id = $1 AND user_id = $2 RETURNING {BINDING_COLUMNS}"
    );
    let Some(deleted) = sqlx::query_as::<_, DbBotBinding>(&query)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
    else {
        return Ok(false);
    };

    if deleted.is_active {
        let query = format!(
            r#"
            UPDATE bot_bindings SET is_active = TRUE
            WHERE id = (
                SELECT id FROM bot_bindings WHERE user_id = $1
                ORDER BY created_at DESC LIMIT 1
            )
            RETURNING {BINDING_COLUMNS}
            "#
        );
        let successor = sqlx::query_as::<_, DbBotBinding>(&query)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

        mirror_active_binding(&mut tx, user_id, successor.as_ref()).await?;
    }

    tx.commit().await?;
    Ok(true)
}

pub async fn bind_chat(
    pool: &Pool<Postgres>,
    user_id: &str,
    bot_id: Uuid,
    chat_id: &str,
    chat_handle: Option<&str>,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        r#"
        UPDATE bot_bindings
        SET chat_id = $3, chat_handle = $4
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(bot_id)
    .bind(user_id)
    .bind(chat_id)
    .bind(chat_handle)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(eyre!("Bot binding {} not found for user {}", bot_id, user_id));
    }

    sqlx::query("UPDATE user_summaries SET telegram_chat_id = $2 WHERE user_id = $1")
        .bind(user_id)
        .bind(chat_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

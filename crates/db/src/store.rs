use async_trait::async_trait;
use eyre::Result;
use uuid::Uuid;
use vitalog_core::models::bot::{BotBinding, UserSummary};

use crate::{
    DbPool,
    models::{DbReminder, NewReminder},
    repositories::{BotRepository, ReminderRepository, bot, reminder},
};

/// Postgres-backed implementation of every repository trait.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl ReminderRepository for PgStore {
    async fn list_all(&self) -> Result<Vec<DbReminder>> {
        reminder::get_all_reminders(&self.pool).await
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<DbReminder>> {
        reminder::get_reminders_by_user(&self.pool, user_id).await
    }

    async fn create(&self, new_reminder: &NewReminder) -> Result<DbReminder> {
        reminder::create_reminder(&self.pool, new_reminder).await
    }

    async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool> {
        reminder::delete_reminder(&self.pool, user_id, id).await
    }
}

#[async_trait]
impl BotRepository for PgStore {
    async fn get_user_summary(&self, user_id: &str) -> Result<Option<UserSummary>> {
        Ok(bot::get_user_summary(&self.pool, user_id).await?.map(Into::into))
    }

    async fn get_bot_binding(&self, id: Uuid) -> Result<Option<BotBinding>> {
        Ok(bot::get_bot_binding_by_id(&self.pool, id).await?.map(Into::into))
    }

    async fn list_bot_bindings(&self, user_id: &str) -> Result<Vec<BotBinding>> {
        let bindings = bot::get_bot_bindings_by_user(&self.pool, user_id).await?;
        Ok(bindings.into_iter().map(Into::into).collect())
    }

    async fn create_bot_binding(
        &self,
        user_id: &str,
        bot_token: &str,
        bot_username: &str,
    ) -> Result<BotBinding> {
        let binding = bot::create_bot_binding(&self.pool, user_id, bot_token, bot_username).await?;
        Ok(binding.into())
    }

    async fn activate_bot_binding(&self, user_id: &str, id: Uuid) -> Result<Option<BotBinding>> {
        Ok(bot::activate_bot_binding(&self.pool, user_id, id)
            .await?
            .map(Into::into))
    }

    async fn delete_bot_binding(&self, user_id: &str, id: Uuid) -> Result<bool> {
        bot::delete_bot_binding(&self.pool, user_id, id).await
    }

    async fn bind_chat(
        &self,
        user_id: &str,
        bot_id: Uuid,
        chat_id: &str,
        chat_handle: Option<&str>,
    ) -> Result<()> {
        bot::bind_chat(&self.pool, user_id, bot_id, chat_id, chat_handle).await
    }
}

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use eyre::{Result, eyre};
use uuid::Uuid;
use vitalog_core::models::bot::{BotBinding, UserSummary};

use crate::{
    models::{DbBotBinding, DbReminder, DbUserSummary, NewReminder},
    repositories::{BotRepository, ReminderRepository},
};

/// Process-local store with the same transactional semantics as `PgStore`.
#[derive(Default)]
pub struct InMemoryStore {
    reminders: Mutex<Vec<DbReminder>>,
    bindings: Mutex<Vec<DbBotBinding>>,
    summaries: Mutex<Vec<DbUserSummary>>,
}

fn lock<T>(collection: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    collection
        .lock()
        .map_err(|_| eyre!("in-memory store lock poisoned"))
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_reminder(&self, reminder: DbReminder) -> Result<()> {
        lock(&self.reminders)?.push(reminder);
        Ok(())
    }

    pub fn insert_bot_binding(&self, binding: DbBotBinding) -> Result<()> {
        lock(&self.bindings)?.push(binding);
        Ok(())
    }

    pub fn upsert_user_summary(&self, summary: DbUserSummary) -> Result<()> {
        let mut summaries = lock(&self.summaries)?;
        summaries.retain(|s| s.user_id != summary.user_id);
        summaries.push(summary);
        Ok(())
    }

    pub fn bot_bindings(&self) -> Result<Vec<DbBotBinding>> {
        Ok(lock(&self.bindings)?.clone())
    }

    pub fn user_summaries(&self) -> Result<Vec<DbUserSummary>> {
        Ok(lock(&self.summaries)?.clone())
    }

    fn mirror(&self, user_id: &str, binding: Option<&DbBotBinding>) -> Result<()> {
        self.upsert_user_summary(DbUserSummary {
            user_id: user_id.to_string(),
            active_bot_id: binding.map(|b| b.id),
            telegram_bot_token: binding.map(|b| b.bot_token.clone()),
            telegram_chat_id: binding.and_then(|b| b.chat_id.clone()),
        })
    }
}

#[async_trait]
impl ReminderRepository for InMemoryStore {
    async fn list_all(&self) -> Result<Vec<DbReminder>> {
        Ok(lock(&self.reminders)?.clone())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<DbReminder>> {
        // Reversed before the stable sort so equal timestamps list the later insert first
        let mut reminders: Vec<_> = lock(&self.reminders)?
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        reminders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reminders)
    }

    async fn create(&self, reminder: &NewReminder) -> Result<DbReminder> {
        let row = DbReminder {
            id: Uuid::new_v4(),
            user_id: reminder.user_id.clone(),
            name: reminder.name.clone(),
            frequency: reminder.schedule.frequency().to_string(),
            time: reminder.time.clone(),
            days_of_week: reminder.schedule.day_names(),
            specific_date: reminder.schedule.specific_date(),
            email: reminder.email.clone(),
            notifications_enabled: reminder.notifications_enabled,
            telegram_notifications_enabled: reminder.telegram_notifications_enabled,
            telegram_chat_id: reminder.telegram_chat_id.clone(),
            created_at: Utc::now(),
        };
        lock(&self.reminders)?.push(row.clone());
        Ok(row)
    }

    async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool> {
        let mut reminders = lock(&self.reminders)?;
        let before = reminders.len();
        reminders.retain(|r| !(r.id == id && r.user_id == user_id));
        Ok(reminders.len() < before)
    }
}

#[async_trait]
impl BotRepository for InMemoryStore {
    async fn get_user_summary(&self, user_id: &str) -> Result<Option<UserSummary>> {
        Ok(lock(&self.summaries)?
            .iter()
            .find(|s| s.user_id == user_id)
            .cloned()
            .map(Into::into))
    }

    async fn get_bot_binding(&self, id: Uuid) -> Result<Option<BotBinding>> {
        Ok(lock(&self.bindings)?
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .map(Into::into))
    }

    async fn list_bot_bindings(&self, user_id: &str) -> Result<Vec<BotBinding>> {
        let mut bindings: Vec<_> = lock(&self.bindings)?
            .iter()
            .rev()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        bindings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bindings.into_iter().map(Into::into).collect())
    }

    async fn create_bot_binding(
        &self,
        user_id: &str,
        bot_token: &str,
        bot_username: &str,
    ) -> Result<BotBinding> {
        let binding = DbBotBinding {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            bot_token: bot_token.to_string(),
            bot_username: bot_username.to_string(),
            chat_id: None,
            chat_handle: None,
            created_at: Utc::now(),
            is_active: true,
        };
        {
            let mut bindings = lock(&self.bindings)?;
            for existing in bindings.iter_mut().filter(|b| b.user_id == user_id) {
                existing.is_active = false;
            }
            bindings.push(binding.clone());
        }
        self.mirror(user_id, Some(&binding))?;
        Ok(binding.into())
    }

    async fn activate_bot_binding(&self, user_id: &str, id: Uuid) -> Result<Option<BotBinding>> {
        let activated = {
            let mut bindings = lock(&self.bindings)?;
            if !bindings.iter().any(|b| b.id == id && b.user_id == user_id) {
                return Ok(None);
            }
            for binding in bindings.iter_mut().filter(|b| b.user_id == user_id) {
                binding.is_active = binding.id == id;
            }
            bindings.iter().find(|b| b.id == id).cloned()
        };
        self.mirror(user_id, activated.as_ref())?;
        Ok(activated.map(Into::into))
    }

    async fn delete_bot_binding(&self, user_id: &str, id: Uuid) -> Result<bool> {
        let successor = {
            let mut bindings = lock(&self.bindings)?;
            let Some(index) = bindings
                .iter()
                .position(|b| b.id == id && b.user_id == user_id)
            else {
                return Ok(false);
            };
            let deleted = bindings.remove(index);
            if !deleted.is_active {
                return Ok(true);
            }
            let newest = bindings
                .iter_mut()
                .filter(|b| b.user_id == user_id)
                .max_by_key(|b| b.created_at);
            newest.map(|b| {
                b.is_active = true;
                b.clone()
            })
        };
        self.mirror(user_id, successor.as_ref())?;
        Ok(true)
    }

    async fn bind_chat(
        &self,
        user_id: &str,
        bot_id: Uuid,
        chat_id: &str,
        chat_handle: Option<&str>,
    ) -> Result<()> {
        let mut bindings = lock(&self.bindings)?;
        let mut summaries = lock(&self.summaries)?;
        let binding = bindings
            .iter_mut()
            .find(|b| b.id == bot_id && b.user_id == user_id)
            .ok_or_else(|| eyre!("Bot binding {} not found for user {}", bot_id, user_id))?;

        binding.chat_id = Some(chat_id.to_string());
        binding.chat_handle = chat_handle.map(str::to_string);
        if let Some(summary) = summaries.iter_mut().find(|s| s.user_id == user_id) {
            summary.telegram_chat_id = Some(chat_id.to_string());
        }
        Ok(())
    }
}

//! Repository seams between the services and the record store.
//!
//! `PgStore` implements these against Postgres; `mock` provides mockall and
//! in-memory implementations for tests.

pub mod bot;
pub mod reminder;

use async_trait::async_trait;
use eyre::Result;
use uuid::Uuid;
use vitalog_core::models::bot::{BotBinding, UserSummary};

use crate::models::{DbReminder, NewReminder};

#[async_trait]
pub trait ReminderRepository: Send + Sync {
    /// Every stored reminder, unpaginated.
    async fn list_all(&self) -> Result<Vec<DbReminder>>;

    /// A user's reminders, newest first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<DbReminder>>;

    async fn create(&self, reminder: &NewReminder) -> Result<DbReminder>;

    /// Returns false when no reminder with that id belongs to the user.
    async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait BotRepository: Send + Sync {
    async fn get_user_summary(&self, user_id: &str) -> Result<Option<UserSummary>>;

    async fn get_bot_binding(&self, id: Uuid) -> Result<Option<BotBinding>>;

    async fn list_bot_bindings(&self, user_id: &str) -> Result<Vec<BotBinding>>;

    /// Inserts a binding as the user's active one and mirrors it into the
    /// user summary.
    async fn create_bot_binding(
        &self,
        user_id: &str,
        bot_token: &str,
        bot_username: &str,
    ) -> Result<BotBinding>;

    /// Makes the binding active and mirrors it; `None` if the user does not
    /// own it.
    async fn activate_bot_binding(&self, user_id: &str, id: Uuid) -> Result<Option<BotBinding>>;

    /// Deletes the binding, promoting the newest remaining one when the
    /// deleted binding was active. Returns false if the user does not own it.
    async fn delete_bot_binding(&self, user_id: &str, id: Uuid) -> Result<bool>;

    /// Records the linked chat on the binding and the summary mirror in one
    /// transaction.
    async fn bind_chat(
        &self,
        user_id: &str,
        bot_id: Uuid,
        chat_id: &str,
        chat_handle: Option<&str>,
    ) -> Result<()>;
}

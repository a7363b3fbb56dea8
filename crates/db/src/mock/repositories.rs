use async_trait::async_trait;
use eyre::Result;
use mockall::mock;
use uuid::Uuid;

use crate::{
    models::{DbReminder, NewReminder},
    repositories::ReminderRepository,
};

// Mock repositories for testing
mock! {
    pub ReminderRepo {}

    #[async_trait]
    impl ReminderRepository for ReminderRepo {
        async fn list_all(&self) -> Result<Vec<DbReminder>>;

        async fn list_for_user(&self, user_id: &str) -> Result<Vec<DbReminder>>;

        async fn create(&self, reminder: &NewReminder) -> Result<DbReminder>;

        async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool>;
    }
}

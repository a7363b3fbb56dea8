use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use eyre::{Result, eyre};
use mockall::mock;
use uuid::Uuid;
use vitalog_api::{ApiState, build_router};
use vitalog_core::models::bot::{BotBinding, UserSummary};
use vitalog_db::{mock::memory::InMemoryStore, repositories::BotRepository};
use vitalog_telegram_bot::ChatTransport;

mock! {
    pub Chat {}

    #[async_trait]
    impl ChatTransport for Chat {
        async fn send_message(&self, credential: &str, chat_id: &str, text: &str) -> Result<()>;
    }
}

pub struct TestContext {
    pub store: Arc<InMemoryStore>,
    pub chat: MockChat,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            chat: MockChat::new(),
        }
    }

    pub fn build_state(self) -> ApiState {
        ApiState {
            reminders: self.store.clone(),
            bots: self.store,
            chat: Arc::new(self.chat),
        }
    }

    /// Consumes the context; keep a clone of `store` to inspect it afterwards.
    pub fn server(self) -> TestServer {
        TestServer::new(build_router(self.build_state())).unwrap()
    }
}

/// Bot repository whose every call fails, standing in for an unreachable store.
pub struct UnreachableBots;

#[async_trait]
impl BotRepository for UnreachableBots {
    async fn get_user_summary(&self, _user_id: &str) -> Result<Option<UserSummary>> {
        Err(eyre!("connection refused"))
    }

    async fn get_bot_binding(&self, _id: Uuid) -> Result<Option<BotBinding>> {
        Err(eyre!("connection refused"))
    }

    async fn list_bot_bindings(&self, _user_id: &str) -> Result<Vec<BotBinding>> {
        Err(eyre!("connection refused"))
    }

    async fn create_bot_binding(&self, _user_id: &str, _bot_token: &str, _bot_username: &str) -> Result<BotBinding> {
        Err(eyre!("connection refused"))
    }

    async fn activate_bot_binding(&self, _user_id: &str, _id: Uuid) -> Result<Option<BotBinding>> {
        Err(eyre!("connection refused"))
    }

    async fn delete_bot_binding(&self, _user_id: &str, _id: Uuid) -> Result<bool> {
        Err(eyre!("connection refused"))
    }

    async fn bind_chat(&self, _user_id: &str, _bot_id: Uuid, _chat_id: &str, _chat_handle: Option<&str>) -> Result<()> {
        Err(eyre!("connection refused"))
    }
}

pub fn start_update(text: &str, chat_id: i64) -> serde_json::Value {
    serde_json::json!({
        "update_id": 1,
        "message": {
            "message_id": 10,
            "chat": { "id": chat_id, "username": "ada", "type": "private" },
            "text": text
        }
    })
}

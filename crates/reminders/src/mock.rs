use async_trait::async_trait;
use eyre::Result;
use mockall::mock;
use vitalog_telegram_bot::ChatTransport;

use crate::channels::{EmailMessage, EmailTransport};

// Mock transports for testing
mock! {
    pub Mailer {}

    #[async_trait]
    impl EmailTransport for Mailer {
        async fn send(&self, message: &EmailMessage) -> Result<()>;
    }
}

mock! {
    pub Chat {}

    #[async_trait]
    impl ChatTransport for Chat {
        async fn send_message(&self, credential: &str, chat_id: &str, text: &str) -> Result<()>;
    }
}

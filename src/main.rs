use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use vitalog_api::{ApiState, config::ApiConfig};
use vitalog_db::{PgStore, create_pool, schema::initialize_database};
use vitalog_telegram_bot::TelegramClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;

    // Create database connection pool
    let db_pool = create_pool(&config.database_url).await?;

    // Initialize database schema
    initialize_database(&db_pool).await?;

    let store = Arc::new(PgStore::new(db_pool));
    let state = ApiState {
        reminders: store.clone(),
        bots: store,
        chat: Arc::new(TelegramClient::new(&config.bot)?),
    };

    // Start API server
    vitalog_api::start_server(config, state).await?;

    Ok(())
}

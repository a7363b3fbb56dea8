use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::FmtSubscriber;
use vitalog_db::{PgStore, create_pool, schema::initialize_database};
use vitalog_reminders::{
    ReminderDispatcher, channels::SmtpMailer, config::DispatcherConfig, scheduler::run_scheduler,
};
use vitalog_telegram_bot::TelegramClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = DispatcherConfig::from_env()?;

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!(timezone = %config.timezone, "Starting Vitalog reminder dispatcher");

    // Create database connection pool
    let db_pool = create_pool(&config.database_url).await?;

    // Initialize database schema
    initialize_database(&db_pool).await?;

    let store = Arc::new(PgStore::new(db_pool));
    let dispatcher = Arc::new(ReminderDispatcher::new(
        store.clone(),
        store,
        Arc::new(SmtpMailer::new(&config.smtp)?),
        Arc::new(TelegramClient::new(&config.bot)?),
        config.timezone,
    ));

    run_scheduler(dispatcher, config.interval, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    })
    .await;

    info!("Reminder dispatcher shut down gracefully");
    Ok(())
}

//! # Vitalog API
//!
//! HTTP surface of the medication reminder service: the messaging-platform
//! webhook that completes account linking, plus reminder and bot-binding
//! management for the owning user.
//!
//! ## Architecture
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Implement request processing logic
//! - **Middleware**: Error mapping shared by every handler
//! - **Config**: Handle environment and application configuration
//!
//! Handlers talk to the store through the `vitalog_db` repository traits, so
//! the router can be built over Postgres or the in-memory store alike.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use eyre::{Result, eyre};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::FmtSubscriber;
use vitalog_db::repositories::{BotRepository, ReminderRepository};
use vitalog_telegram_bot::ChatTransport;

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    pub reminders: Arc<dyn ReminderRepository>,
    pub bots: Arc<dyn BotRepository>,
    /// Outbound transport for handshake confirmations
    pub chat: Arc<dyn ChatTransport>,
}

/// Builds the application router with all routes attached to `state`.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Account-linking webhook
        .merge(routes::telegram::routes())
        // Reminder management endpoints
        .merge(routes::reminders::routes())
        // Bot binding endpoints
        .merge(routes::bots::routes())
        .with_state(Arc::new(state))
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| eyre!("Invalid CORS origin {:?}: {}", origin, e))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_origin(origins)
        .allow_credentials(true))
}

/// Starts the API server with the provided configuration and state
///
/// Installs the tracing subscriber, applies CORS and the request timeout,
/// and serves until the listener fails.
pub async fn start_server(config: config::ApiConfig, state: ApiState) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let app = build_router(state);

    // Apply CORS configuration if origins are specified
    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)?),
        None => app,
    };

    // Add request tracing and timeout middleware
    let app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(config.request_timeout)),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

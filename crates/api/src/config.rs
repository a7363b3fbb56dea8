//! Settings for the HTTP server process.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: bind address (default: "0.0.0.0")
//! - `API_PORT`: listen port (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `LOG_LEVEL`: one of trace, debug, info, warn, error (default: "info")
//! - `API_CORS_ORIGINS`: comma-separated browser origins allowed to call the API
//! - `API_REQUEST_TIMEOUT_SECONDS`: per-request timeout (default: 30)
//! - `TELEGRAM_API_BASE` / `CHAT_REQUEST_TIMEOUT_SECONDS`: see `BotConfig`

use std::{env, time::Duration};

use eyre::{Result, WrapErr, eyre};
use tracing::Level;
use vitalog_telegram_bot::config::BotConfig;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub log_level: Level,
    /// `None` leaves CORS off entirely
    pub cors_origins: Option<Vec<String>>,
    pub request_timeout: Duration,
    /// Outbound bot API used for the linking confirmation
    pub bot: BotConfig,
}

impl ApiConfig {
    /// Reads the server settings from the process environment.
    ///
    /// Fails when `DATABASE_URL` is missing or a numeric setting does not parse.
    pub fn from_env() -> Result<Self> {
        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;

        let log_level = env::var("LOG_LEVEL")
            .ok()
            .and_then(|level| level.trim().parse().ok())
            .unwrap_or(Level::INFO);

        let cors_origins = env::var("API_CORS_ORIGINS")
            .ok()
            .and_then(|origins| parse_cors_origins(&origins));

        let request_timeout = parse_timeout(
            &env::var("API_REQUEST_TIMEOUT_SECONDS").unwrap_or_else(|_| "30".to_string()),
        )?;

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            request_timeout,
            bot: BotConfig::from_env()?,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Splits a comma-separated origin list, dropping blanks. An empty list
/// means CORS stays off.
pub fn parse_cors_origins(value: &str) -> Option<Vec<String>> {
    let origins: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect();
    (!origins.is_empty()).then_some(origins)
}

fn parse_timeout(value: &str) -> Result<Duration> {
    let secs: u64 = value
        .trim()
        .parse()
        .wrap_err("Invalid API_REQUEST_TIMEOUT_SECONDS value")?;
    if secs == 0 {
        return Err(eyre!("API_REQUEST_TIMEOUT_SECONDS must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

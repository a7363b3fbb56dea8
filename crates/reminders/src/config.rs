//! Configuration for the reminder dispatcher process.
//!
//! ## Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `SMTP_HOST`: SMTP relay host (default: "localhost")
//! - `SMTP_PORT`: SMTP relay port (default: 587)
//! - `SMTP_USERNAME` / `SMTP_PASSWORD`: relay credentials (optional, both or neither)
//! - `EMAIL_FROM`: sender mailbox for reminder emails (required)
//! - `REMINDER_TIMEZONE`: IANA zone in which reminder times are read (default: "UTC")
//! - `DISPATCH_INTERVAL_SECONDS`: seconds between cycles (default: 3600)
//! - `TELEGRAM_API_BASE` / `CHAT_REQUEST_TIMEOUT_SECONDS`: see `BotConfig`
//! - `LOG_LEVEL`: Logging level (default: "info")

use std::{env, time::Duration};

use chrono_tz::Tz;
use eyre::{Result, WrapErr, eyre};
use tracing::Level;
use vitalog_telegram_bot::config::BotConfig;

/// Outbound SMTP relay settings.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Sender mailbox, e.g. `Vitalog <reminders@example.com>`
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub database_url: String,
    pub smtp: SmtpConfig,
    /// Zone whose wall clock reminder times are written in
    pub timezone: Tz,
    pub interval: Duration,
    pub bot: BotConfig,
    pub log_level: Level,
}

impl DispatcherConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;

        let smtp = SmtpConfig {
            host: env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .wrap_err("Invalid SMTP_PORT value")?,
            username: env::var("SMTP_USERNAME").ok(),
            password: env::var("SMTP_PASSWORD").ok(),
            from: env::var("EMAIL_FROM").wrap_err("EMAIL_FROM environment variable must be set")?,
        };

        let timezone = parse_timezone(&env::var("REMINDER_TIMEZONE").unwrap_or_else(|_| "UTC".to_string()))?;

        let interval_secs: u64 = env::var("DISPATCH_INTERVAL_SECONDS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .wrap_err("Invalid DISPATCH_INTERVAL_SECONDS value")?;
        if interval_secs == 0 {
            return Err(eyre!("DISPATCH_INTERVAL_SECONDS must be greater than zero"));
        }

        let log_level = parse_log_level(&env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));

        Ok(Self {
            database_url,
            smtp,
            timezone,
            interval: Duration::from_secs(interval_secs),
            bot: BotConfig::from_env()?,
            log_level,
        })
    }
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| eyre!("Invalid REMINDER_TIMEZONE {:?}: {}", name, e))
}

pub fn parse_log_level(value: &str) -> Level {
    match value {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honored for local development.

use chrono::NaiveTime;
use std::env;

/// Default local time of the daily reminder sweep.
pub const DEFAULT_REMINDER_TIME: &str = "19:00";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection URL (e.g. `sqlite://group-runs.db`)
    pub database_url: String,
    /// Server port
    pub port: u16,
    /// Local wall-clock time at which the reminder sweep fires each day
    pub reminder_time: NaiveTime,
    /// Optional endpoint that receives reminder events as JSON
    pub reminder_webhook_url: Option<String>,
    /// Shared secret for `/tasks/*` routes (`X-Tasks-Token`). Unset disables them.
    pub tasks_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let reminder_time = env::var("REMINDER_TIME")
            .unwrap_or_else(|_| DEFAULT_REMINDER_TIME.to_string());

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://group-runs.db".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            reminder_time: parse_reminder_time(&reminder_time)?,
            reminder_webhook_url: non_empty_var("REMINDER_WEBHOOK_URL"),
            tasks_token: non_empty_var("TASKS_TOKEN"),
        })
    }

    /// Config for tests: in-memory database, no webhook.
    pub fn test_default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            port: 8080,
            reminder_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap_or_default(),
            reminder_webhook_url: None,
            tasks_token: Some("test-tasks-token".to_string()),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse an `HH:MM` reminder time. Seconds are always zero.
pub fn parse_reminder_time(raw: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| ConfigError::Invalid("REMINDER_TIME", raw.to_string()))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}

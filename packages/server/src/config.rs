use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables (spec §6).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub log_level: String,
    pub port: u16,
    pub max_workers: usize,
    pub refresh_interval: Duration,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub queue_capacity: usize,
}

impl Config {
    /// Load configuration from the environment, loading a `.env` file first
    /// if one is present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();

        let max_workers: usize = env::var("MAX_WORKERS")
            .unwrap_or_else(|_| "20".to_string())
            .parse()
            .context("MAX_WORKERS must be a valid number")?;

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            refresh_interval: Duration::from_secs(
                env::var("REFRESH_INTERVAL_SECS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .context("REFRESH_INTERVAL_SECS must be a valid number")?,
            ),
            request_timeout: Duration::from_secs(
                env::var("REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .context("REQUEST_TIMEOUT_SECS must be a valid number")?,
            ),
            max_retries: env::var("MAX_RETRIES")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .context("MAX_RETRIES must be a valid number")?,
            queue_capacity: max_workers * 4,
            max_workers,
        })
    }
}

use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use time::UtcOffset;

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Offset that defines the local calendar day used for "today".
    pub utc_offset_hours: i8,
    /// Fixed seed for the reschedule shuffle; entropy when unset.
    pub seed: Option<u64>,
}

impl ScheduleConfig {
    pub fn utc_offset(&self) -> anyhow::Result<UtcOffset> {
        UtcOffset::from_hms(self.utc_offset_hours, 0, 0)
            .with_context(|| format!("invalid SCHEDULE_UTC_OFFSET_HOURS {}", self.utc_offset_hours))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub barn_url: String,
    pub barn_timeout_secs: u64,
    pub schedule: ScheduleConfig,
    pub host: String,
    pub port: u16,
    pub shutdown_grace_secs: u64,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let barn_url = std::env::var("BARN_URL").context("BARN_URL is not set")?;
        let schedule = ScheduleConfig {
            utc_offset_hours: env_or("SCHEDULE_UTC_OFFSET_HOURS", 0),
            seed: std::env::var("SCHEDULE_SEED")
                .ok()
                .and_then(|v| v.parse::<u64>().ok()),
        };
        Ok(Self {
            database_url,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 10),
            barn_url,
            barn_timeout_secs: env_or("BARN_TIMEOUT_SECS", 10),
            schedule,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("APP_PORT", 8080),
            shutdown_grace_secs: env_or("SHUTDOWN_GRACE_SECS", 15),
        })
    }

    pub fn barn_timeout(&self) -> Duration {
        Duration::from_secs(self.barn_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

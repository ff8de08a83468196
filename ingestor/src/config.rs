use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::db::StoreConfig;
use crate::errors::{Error, Result};

/// Runtime settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub http_addr: String,
    pub store: StoreConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; missing keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://sensordata.db".to_string());
        let http_addr = lookup("HTTP_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string());
        let max_connections: u32 = parse_or(&lookup, "DB_MAX_CONNECTIONS", 8)?;
        let acquire_timeout_secs: u64 = parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 5)?;
        let busy_timeout_ms: u64 = parse_or(&lookup, "DB_BUSY_TIMEOUT_MS", 5000)?;

        if max_connections == 0 {
            return Err(Error::Config(
                "DB_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            http_addr,
            store: StoreConfig {
                database_url,
                max_connections,
                acquire_timeout: Duration::from_secs(acquire_timeout_secs),
                busy_timeout: Duration::from_millis(busy_timeout_ms),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{key} has invalid value {raw:?}"))),
        None => Ok(default),
    }
}

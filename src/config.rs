use std::str::FromStr;
use std::time::Duration;

use crate::ConfigError;

/// Connection settings for [`PgDriver`](crate::PgDriver).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 0,
            acquire_timeout: Duration::from_secs(30),
        }
    }

    /// Loads the config from environment variables.
    ///
    /// `DATABASE_URL` is required. `DATABASE_MAX_CONNECTIONS`,
    /// `DATABASE_MIN_CONNECTIONS` and `DATABASE_ACQUIRE_TIMEOUT_SECS`
    /// override the defaults when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let mut config = Self::new(url);

        if let Some(max) = parse(&lookup, "DATABASE_MAX_CONNECTIONS")? {
            config.max_connections = max;
        }
        if let Some(min) = parse(&lookup, "DATABASE_MIN_CONNECTIONS")? {
            config.min_connections = min;
        }
        if let Some(secs) = parse(&lookup, "DATABASE_ACQUIRE_TIMEOUT_SECS")? {
            config.acquire_timeout = Duration::from_secs(secs);
        }

        if config.min_connections > config.max_connections {
            return Err(ConfigError::Invalid {
                key: "DATABASE_MIN_CONNECTIONS",
                value: config.min_connections.to_string(),
            });
        }
        Ok(config)
    }
}

fn parse<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

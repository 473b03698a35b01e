//! Environment-driven configuration.
//!
//! Every setting has a default. A missing variable is logged and the default
//! used; a present but unparseable one is an error.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings for `dive-server` and `dive-populate`.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    /// Database file path, or `:memory:`.
    pub database: String,
    pub admin_user: String,
    pub admin_password: String,
    pub seed_on_start: bool,
}

impl ServerConfig {
    /// Load from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load(&lookup, "DIVE_PORT", "5000")?,
            database: try_load(&lookup, "DIVE_DATABASE", "diving_center.db")?,
            admin_user: try_load(&lookup, "DIVE_ADMIN_USER", "admin")?,
            admin_password: try_load(&lookup, "DIVE_ADMIN_PASSWORD", "admin")?,
            seed_on_start: try_load(&lookup, "DIVE_SEED_ON_START", "false")?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

/// Cache behaviour of the sync client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// How long a cached collection is served without refetching.
    pub ttl: Duration,
    /// Upper bound on a single List fetch.
    pub fetch_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5 * 60),
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

impl SyncConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| env::var(key).ok())
    }

    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            ttl: Duration::from_millis(try_load(&lookup, "DIVE_CACHE_TTL_MS", "300000")?),
            fetch_timeout: Duration::from_millis(try_load(
                &lookup,
                "DIVE_FETCH_TIMEOUT_MS",
                "10000",
            )?),
        })
    }
}

/// Location and cache behaviour of the forecast source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub ttl: Duration,
    pub timeout: Duration,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            latitude: -0.6413,
            longitude: 73.1586,
            ttl: Duration::from_secs(30 * 60),
            timeout: Duration::from_secs(5),
        }
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    value.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }
    })
}

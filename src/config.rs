//! Environment-driven configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{PosError, Result};

#[derive(Clone, Debug)]
pub struct Config {
    /// Port the relay binary listens on.
    pub port: u16,
    /// Base URL of the REST relay, including the `/api` prefix.
    pub relay_base_url: String,
    /// Path of the local cache snapshot file.
    pub cache_path: PathBuf,
    /// Per-call timeout for the primary document-store transport.
    pub primary_timeout: Duration,
    /// Per-call timeout for the relay transport.
    pub relay_timeout: Duration,
    /// Timeout for the relay liveness probe.
    pub health_timeout: Duration,
    /// How long a liveness probe result stays cached.
    pub liveness_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            relay_base_url: "http://localhost:3000/api".to_string(),
            cache_path: PathBuf::from("sari-pos-cache.json"),
            primary_timeout: Duration::from_secs(5),
            relay_timeout: Duration::from_secs(8),
            health_timeout: Duration::from_secs(2),
            liveness_ttl: Duration::from_secs(60),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            port: env_parse("PORT", defaults.port)?,
            relay_base_url: std::env::var("RELAY_BASE_URL")
                .unwrap_or(defaults.relay_base_url),
            cache_path: std::env::var("POS_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_path),
            primary_timeout: env_secs("STORE_TIMEOUT_SECS", defaults.primary_timeout)?,
            relay_timeout: env_secs("RELAY_TIMEOUT_SECS", defaults.relay_timeout)?,
            health_timeout: env_secs("HEALTH_TIMEOUT_SECS", defaults.health_timeout)?,
            liveness_ttl: env_secs("LIVENESS_TTL_SECS", defaults.liveness_ttl)?,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| PosError::Validation(format!("invalid value for {key}: {raw}"))),
        Err(_) => Ok(default),
    }
}

fn env_secs(key: &str, default: Duration) -> Result<Duration> {
    Ok(Duration::from_secs(env_parse(
        key,
        default.as_secs(),
    )?))
}

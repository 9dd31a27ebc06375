//! Conference Controller configuration.
//!
//! Configuration is loaded from environment variables. All sensitive
//! fields are redacted in Debug output.

use crate::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default callback ingestion bind address.
pub const DEFAULT_CALLBACK_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default health endpoint bind address.
pub const DEFAULT_HEALTH_BIND_ADDRESS: &str = "0.0.0.0:8081";

/// Default consultation invitation TTL in seconds.
pub const DEFAULT_INVITATION_TTL_SECONDS: u64 = 120;

/// Default daily population lock TTL in seconds.
pub const DEFAULT_POPULATION_LOCK_TTL_SECONDS: u64 = 300;

/// Default CC instance ID prefix.
pub const DEFAULT_CC_ID_PREFIX: &str = "cc";

/// Conference Controller configuration.
///
/// Loaded from environment variables with sensible defaults.
/// Sensitive fields are redacted in Debug output.
#[derive(Clone)]
pub struct Config {
    /// Redis connection URL (for the population lock).
    /// Protected by `SecretString` to prevent accidental logging.
    pub redis_url: SecretString,

    /// Callback ingestion bind address (default: "0.0.0.0:8080").
    pub callback_bind_address: String,

    /// Health endpoint bind address (default: "0.0.0.0:8081").
    pub health_bind_address: String,

    /// Base URL of the conference detail provider.
    pub provider_base_url: String,

    /// Base URL of the media platform command API.
    pub platform_base_url: String,

    /// Consultation invitation TTL in seconds (default: 120).
    pub invitation_ttl_seconds: u64,

    /// Daily population lock TTL in seconds (default: 300).
    pub population_lock_ttl_seconds: u64,

    /// Unique identifier for this CC instance.
    pub cc_id: String,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("redis_url", &"[REDACTED]")
            .field("callback_bind_address", &self.callback_bind_address)
            .field("health_bind_address", &self.health_bind_address)
            .field("provider_base_url", &self.provider_base_url)
            .field("platform_base_url", &self.platform_base_url)
            .field("invitation_ttl_seconds", &self.invitation_ttl_seconds)
            .field(
                "population_lock_ttl_seconds",
                &self.population_lock_ttl_seconds,
            )
            .field("cc_id", &self.cc_id)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let redis_url = SecretString::from(
            vars.get("REDIS_URL")
                .ok_or_else(|| ConfigError::MissingEnvVar("REDIS_URL".to_string()))?
                .clone(),
        );

        let provider_base_url = vars
            .get("CC_PROVIDER_BASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("CC_PROVIDER_BASE_URL".to_string()))?
            .clone();

        let platform_base_url = vars
            .get("CC_PLATFORM_BASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("CC_PLATFORM_BASE_URL".to_string()))?
            .clone();

        let callback_bind_address = vars
            .get("CC_CALLBACK_BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_CALLBACK_BIND_ADDRESS.to_string());

        let health_bind_address = vars
            .get("CC_HEALTH_BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_HEALTH_BIND_ADDRESS.to_string());

        let invitation_ttl_seconds = match vars.get("CC_INVITATION_TTL_SECONDS") {
            Some(raw) => raw.parse().map_err(|_| {
                ConfigError::InvalidValue(format!("CC_INVITATION_TTL_SECONDS: {raw}"))
            })?,
            None => DEFAULT_INVITATION_TTL_SECONDS,
        };

        let population_lock_ttl_seconds = match vars.get("CC_POPULATION_LOCK_TTL_SECONDS") {
            Some(raw) => raw.parse().map_err(|_| {
                ConfigError::InvalidValue(format!("CC_POPULATION_LOCK_TTL_SECONDS: {raw}"))
            })?,
            None => DEFAULT_POPULATION_LOCK_TTL_SECONDS,
        };

        let cc_id = vars.get("CC_ID").cloned().unwrap_or_else(|| {
            format!("{DEFAULT_CC_ID_PREFIX}-{}", uuid::Uuid::new_v4())
        });

        Ok(Self {
            redis_url,
            callback_bind_address,
            health_bind_address,
            provider_base_url,
            platform_base_url,
            invitation_ttl_seconds,
            population_lock_ttl_seconds,
            cc_id,
        })
    }
}

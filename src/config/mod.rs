use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use thiserror::Error;
use url::Url;

use crate::store::models::JOURNAL_ENTRIES_TABLE;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub store: StoreConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    #[serde(skip_serializing)]
    pub service_key: String,
    pub table: String,
    pub timeout_secs: u64,
    pub read_retries: u32,
    pub retry_backoff_ms: u64,
}

// Keep the service key out of logs
impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("service_key", &"<redacted>")
            .field("table", &self.table)
            .field("timeout_secs", &self.timeout_secs)
            .field("read_retries", &self.read_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// The single browser origin allowed to call the API with credentials
    pub cors_origin: String,
}

/// Startup configuration problems. Any of these is fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, so tests don't have
    /// to touch the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = match get("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let url = get("SUPABASE_URL")
            .or_else(|| get("NEXT_PUBLIC_SUPABASE_URL"))
            .ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        let service_key =
            get("SUPABASE_SERVICE_ROLE_KEY").ok_or(ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"))?;

        let parsed = Url::parse(&url).map_err(|e| ConfigError::Invalid {
            key: "SUPABASE_URL",
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                key: "SUPABASE_URL",
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        // Set defaults based on environment, then override with specific env vars
        let mut config = match environment {
            Environment::Production => Self::production(url, service_key),
            Environment::Staging => Self::staging(url, service_key),
            Environment::Development => Self::development(url, service_key),
        };

        if let Some(v) = get("JOURNAL_TABLE") {
            config.store.table = v;
        }
        if let Some(v) = get("SUPABASE_TIMEOUT_SECS") {
            config.store.timeout_secs = parse_number("SUPABASE_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("STORE_READ_RETRIES") {
            config.store.read_retries = parse_number("STORE_READ_RETRIES", &v)?;
        }
        if let Some(v) = get("STORE_RETRY_BACKOFF_MS") {
            config.store.retry_backoff_ms = parse_number("STORE_RETRY_BACKOFF_MS", &v)?;
        }
        if let Some(v) = get("HOST") {
            config.api.host = v;
        }
        if let Some(v) = get("PORT") {
            config.api.port = parse_number("PORT", &v)?;
        }
        if let Some(v) = get("API_MAX_REQUEST_SIZE_BYTES") {
            config.api.max_request_size_bytes = parse_number("API_MAX_REQUEST_SIZE_BYTES", &v)?;
        }
        if let Some(v) = get("CORS_ORIGIN") {
            config.security.cors_origin = normalize_origin(&v)?;
        }

        Ok(config)
    }

    fn development(url: String, service_key: String) -> Self {
        Self {
            environment: Environment::Development,
            store: StoreConfig {
                url,
                service_key,
                table: JOURNAL_ENTRIES_TABLE.to_string(),
                timeout_secs: 10,
                read_retries: 0,
                retry_backoff_ms: 100,
            },
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig {
                cors_origin: "http://localhost:3000".to_string(),
            },
        }
    }

    fn staging(url: String, service_key: String) -> Self {
        let mut config = Self::development(url, service_key);
        config.environment = Environment::Staging;
        config.store.read_retries = 2;
        config.api.max_request_size_bytes = 256 * 1024;
        config
    }

    fn production(url: String, service_key: String) -> Self {
        let mut config = Self::development(url, service_key);
        config.environment = Environment::Production;
        config.store.timeout_secs = 5;
        config.store.read_retries = 2;
        config.api.max_request_size_bytes = 256 * 1024;
        config
    }
}

fn parse_number<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

/// Reduce a configured origin to `scheme://host[:port]`
fn normalize_origin(value: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: "CORS_ORIGIN",
        reason,
    };
    let url = Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    let origin = url.origin();
    if !origin.is_tuple() {
        return Err(invalid(format!("'{}' has no usable origin", value)));
    }
    Ok(origin.ascii_serialization())
}

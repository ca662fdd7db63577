// src/config.rs

use std::{env, fmt};

use thiserror::Error;
use uuid::Uuid;

/// `DATABASE_URL` value that selects the in-process store.
pub const MEMORY_STORE_URL: &str = "memory://";

pub const DEFAULT_SESSION_TTL_SECS: u64 = 12 * 60 * 60;
pub const MAX_SESSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;
pub const DEFAULT_STORE_RETRY_ATTEMPTS: u32 = 2;
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Startup configuration, read once in `main` and passed down explicitly.
#[derive(Clone)]
pub struct Config {
    /// Store endpoint. [`MEMORY_STORE_URL`] selects the in-memory store.
    pub database_url: String,
    /// Store credential; overrides a password embedded in `database_url`.
    pub database_password: Option<String>,
    pub admin_password: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub store_retry_attempts: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = required("DATABASE_URL")?;
        let database_password = optional("DATABASE_PASSWORD");
        let admin_password = required("ADMIN_PASSWORD")?;

        // Without a configured secret, tokens die with the process.
        let jwt_secret = optional("JWT_SECRET")
            .unwrap_or_else(|| format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple()));

        let jwt_expiration =
            session_ttl(parsed("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?)?;
        let store_retry_attempts = parsed("STORE_RETRY_ATTEMPTS", DEFAULT_STORE_RETRY_ATTEMPTS)?;
        let port = parsed("PORT", DEFAULT_PORT)?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            database_url,
            database_password,
            admin_password,
            jwt_secret,
            jwt_expiration,
            store_retry_attempts,
            port,
            rust_log,
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_STORE_URL
    }
}

fn optional(key: &'static str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    optional(key).ok_or(ConfigError::Missing(key))
}

fn parsed<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

/// Session lifetimes must be between one second and [`MAX_SESSION_TTL_SECS`].
fn session_ttl(secs: u64) -> Result<u64, ConfigError> {
    if (1..=MAX_SESSION_TTL_SECS).contains(&secs) {
        Ok(secs)
    } else {
        Err(ConfigError::Invalid {
            key: "SESSION_TTL_SECS",
            value: secs.to_string(),
        })
    }
}

// Secrets are redacted so the config can be logged.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &redact_url(&self.database_url))
            .field("database_password", &self.database_password.as_ref().map(|_| "***"))
            .field("admin_password", &"***")
            .field("jwt_secret", &"***")
            .field("jwt_expiration", &self.jwt_expiration)
            .field("store_retry_attempts", &self.store_retry_attempts)
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

/// Strips the userinfo part of a connection URL.
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}***{}", &url[..scheme_end + 3], &url[at..])
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            database_url: "postgres://survey:hunter2@db:5432/survey".to_string(),
            database_password: Some("hunter2".to_string()),
            admin_password: "admin-pass".to_string(),
            jwt_secret: "jwt".to_string(),
            jwt_expiration: 60,
            store_retry_attempts: 0,
            port: 3000,
            rust_log: "info".to_string(),
        }
    }

    #[test]
    fn debug_output_hides_secrets() {
        let printed = format!("{:?}", sample());
        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains("admin-pass"));
        assert!(printed.contains("postgres://***@db:5432/survey"));
    }

    #[test]
    fn urls_without_credentials_are_unchanged() {
        assert_eq!(redact_url("memory://"), "memory://");
        assert_eq!(redact_url("postgres://db/survey"), "postgres://db/survey");
    }

    #[test]
    fn session_ttl_must_be_in_range() {
        assert_eq!(session_ttl(DEFAULT_SESSION_TTL_SECS).unwrap(), DEFAULT_SESSION_TTL_SECS);
        assert_eq!(session_ttl(MAX_SESSION_TTL_SECS).unwrap(), MAX_SESSION_TTL_SECS);
        assert!(matches!(
            session_ttl(0),
            Err(ConfigError::Invalid { key: "SESSION_TTL_SECS", .. })
        ));
        assert!(matches!(
            session_ttl(u64::MAX),
            Err(ConfigError::Invalid { key: "SESSION_TTL_SECS", .. })
        ));
    }

    #[test]
    fn memory_url_selects_memory_store() {
        let mut config = sample();
        assert!(!config.uses_memory_store());
        config.database_url = MEMORY_STORE_URL.to_string();
        assert!(config.uses_memory_store());
    }
}

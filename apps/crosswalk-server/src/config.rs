//! Application configuration loaded from environment variables.
//!
//! Fail-fast: required variables must be present and valid, or the
//! application exits with a clear error message.

use std::env;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is unset.
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// An environment variable holds an unparseable value.
    #[error("Invalid value for {name}: {message}")]
    InvalidVar {
        name: &'static str,
        message: String,
    },
}

/// Server configuration.
///
/// The [`Debug`] impl redacts the profile store secret.
#[derive(Clone)]
pub struct Config {
    /// Listen address, e.g. "0.0.0.0:8080".
    pub bind_addr: String,

    /// Profile store base URL.
    pub profile_store_url: String,

    /// Profile store API key.
    pub profile_store_api_key: String,

    /// Profile store API secret.
    pub profile_store_secret: String,

    /// Outbound request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Log filter directive (e.g. "info,crosswalk=debug").
    pub log_filter: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_addr", &self.bind_addr)
            .field("profile_store_url", &self.profile_store_url)
            .field("profile_store_api_key", &self.profile_store_api_key)
            .field("profile_store_secret", &"[REDACTED]")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("log_filter", &self.log_filter)
            .finish()
    }
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            profile_store_url: required("PROFILE_STORE_URL")?,
            profile_store_api_key: required("PROFILE_STORE_API_KEY")?,
            profile_store_secret: required("PROFILE_STORE_SECRET")?,
            request_timeout_secs: parsed_or("REQUEST_TIMEOUT_SECS", 30)?,
            log_filter: env::var("LOG_FILTER").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

fn parsed_or(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(value) => value.parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::InvalidVar {
                name,
                message: e.to_string(),
            }
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let config = Config {
            bind_addr: "0.0.0.0:8080".to_string(),
            profile_store_url: "https://profiles.example.com".to_string(),
            profile_store_api_key: "key".to_string(),
            profile_store_secret: "hunter2".to_string(),
            request_timeout_secs: 30,
            log_filter: "info".to_string(),
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_missing_var_message_names_the_variable() {
        let error = ConfigError::MissingVar("PROFILE_STORE_URL");
        assert_eq!(
            error.to_string(),
            "Missing required environment variable: PROFILE_STORE_URL"
        );
    }
}

//! Configuration for the sessiongate client
//!
//! Defaults, overlaid by environment variables (a `.env` file is loaded by
//! the binary first), then by command-line flags.

use crate::auth::{default_token_path, Endpoints};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const ENV_API_URL: &str = "SESSIONGATE_API_URL";
pub const ENV_TOKEN_PATH: &str = "SESSIONGATE_TOKEN_PATH";
pub const ENV_TIMEOUT_SECS: &str = "SESSIONGATE_TIMEOUT_SECS";
pub const ENV_LOGIN_PATH: &str = "SESSIONGATE_LOGIN_PATH";
pub const ENV_REGISTER_PATH: &str = "SESSIONGATE_REGISTER_PATH";
pub const ENV_CURRENT_USER_PATH: &str = "SESSIONGATE_CURRENT_USER_PATH";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Application configuration structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the authentication API
    pub api_url: String,

    /// File holding the persisted token
    pub token_path: PathBuf,

    /// HTTP request timeout in seconds
    pub timeout_secs: u64,

    /// Endpoint paths relative to `api_url`
    pub endpoints: Endpoints,
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            api_url: "http://127.0.0.1:8000".to_string(),
            token_path: default_token_path(),
            timeout_secs: 30,
            endpoints: Endpoints::default(),
        }
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup; blank values are ignored
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::new();

        if let Some(url) = get(ENV_API_URL) {
            config.api_url = url;
        }
        if let Some(path) = get(ENV_TOKEN_PATH) {
            config.token_path = PathBuf::from(path);
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            config.timeout_secs = parse_timeout(ENV_TIMEOUT_SECS, &raw)?;
        }
        if let Some(path) = get(ENV_LOGIN_PATH) {
            config.endpoints.login = path;
        }
        if let Some(path) = get(ENV_REGISTER_PATH) {
            config.endpoints.register = path;
        }
        if let Some(path) = get(ENV_CURRENT_USER_PATH) {
            config.endpoints.current_user = path;
        }

        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_timeout(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
        reason: reason.to_string(),
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(invalid("must be greater than zero")),
        Ok(secs) => Ok(secs),
        Err(e) => Err(invalid(&e.to_string())),
    }
}

//! Client configuration read from the environment.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MARKETMON_API_URL` | `http://localhost:8080` | Backend base URL |
//! | `MARKETMON_TIMEOUT_MS` | `10000` | Per-request timeout |
//! | `MARKETMON_CREDENTIALS` | `$HOME/.marketmon/credentials.json` | Stored credential file |

use std::path::PathBuf;

use reqwest::Url;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} is not a usable backend URL ({reason}): '{value}'")]
    InvalidUrl {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("{key} must be a positive integer: '{value}'")]
    InvalidNumber { key: &'static str, value: String },

    #[error("cannot locate a home directory for the credential file; set MARKETMON_CREDENTIALS")]
    NoCredentialsPath,
}

/// Resolved client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub timeout_ms: u64,
    pub credentials_path: PathBuf,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = match lookup("MARKETMON_API_URL") {
            Some(value) => normalize_base_url("MARKETMON_API_URL", &value)?,
            None => String::from(DEFAULT_API_URL),
        };

        let timeout_ms = match lookup("MARKETMON_TIMEOUT_MS") {
            Some(value) => parse_timeout("MARKETMON_TIMEOUT_MS", &value)?,
            None => DEFAULT_TIMEOUT_MS,
        };

        let credentials_path = match lookup("MARKETMON_CREDENTIALS") {
            Some(value) if !value.trim().is_empty() => PathBuf::from(value),
            _ => lookup("HOME")
                .or_else(|| lookup("USERPROFILE"))
                .filter(|home| !home.trim().is_empty())
                .map(|home| PathBuf::from(home).join(".marketmon").join("credentials.json"))
                .ok_or(ConfigError::NoCredentialsPath)?,
        };

        Ok(Self {
            api_base_url,
            timeout_ms,
            credentials_path,
        })
    }

    pub fn with_api_base_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.api_base_url = normalize_base_url("--api-url", url)?;
        Ok(self)
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Result<Self, ConfigError> {
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidNumber {
                key: "--timeout-ms",
                value: String::from("0"),
            });
        }
        self.timeout_ms = timeout_ms;
        Ok(self)
    }

    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = path.into();
        self
    }
}

/// Base URL without a trailing slash. Paths such as `/instruments` are
/// appended verbatim, so a query or fragment would corrupt every request.
fn normalize_base_url(key: &'static str, value: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        key,
        value: value.to_owned(),
        reason,
    };

    let url = Url::parse(value.trim()).map_err(|error| invalid(error.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().unwrap_or_default().is_empty() {
        return Err(invalid(String::from("missing host")));
    }
    if url.query().is_some() {
        return Err(invalid(String::from("query strings are not allowed")));
    }
    if url.fragment().is_some() {
        return Err(invalid(String::from("fragments are not allowed")));
    }

    Ok(url.as_str().trim_end_matches('/').to_owned())
}

fn parse_timeout(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(ConfigError::InvalidNumber {
            key,
            value: value.to_owned(),
        }),
    }
}

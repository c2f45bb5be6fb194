//! Server configuration
//!
//! Read once at startup from environment variables:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `WAYFINDER_HOST` | `127.0.0.1` |
//! | `WAYFINDER_PORT` | `3000` |
//! | `WAYFINDER_DB_PATH` | `~/.wayfinder/database/wayfinder.db` |
//! | `CORS_ALLOW_ORIGIN` | Vite dev server origins (comma-separated list) |

use axum::http::HeaderValue;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

/// Origins allowed when `CORS_ALLOW_ORIGIN` is unset
pub const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://127.0.0.1:5173"];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },

    #[error("Failed to get home directory; set WAYFINDER_DB_PATH")]
    NoHomeDirectory,
}

impl ConfigError {
    fn invalid(var: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            var,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// Build from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("WAYFINDER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("WAYFINDER_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid("WAYFINDER_PORT", format!("'{}': {}", raw, e)))?,
            None => DEFAULT_PORT,
        };

        let db_path = match lookup("WAYFINDER_DB_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };

        let cors_origins = match lookup("CORS_ALLOW_ORIGIN") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        let config = Self {
            host,
            port,
            db_path,
            cors_origins,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::invalid("WAYFINDER_HOST", "must not be empty"));
        }
        if self.port == 0 {
            return Err(ConfigError::invalid("WAYFINDER_PORT", "must not be 0"));
        }
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::invalid("WAYFINDER_DB_PATH", "must not be empty"));
        }
        for origin in &self.cors_origins {
            if origin.parse::<HeaderValue>().is_err() {
                return Err(ConfigError::invalid(
                    "CORS_ALLOW_ORIGIN",
                    format!("'{}' is not a valid origin", origin),
                ));
            }
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `~/.wayfinder/database/wayfinder.db`
fn default_db_path() -> Result<PathBuf, ConfigError> {
    let home_dir = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
    Ok(home_dir
        .join(".wayfinder")
        .join("database")
        .join("wayfinder.db"))
}

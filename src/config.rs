//! Application configuration management
//!
//! This module handles loading and validating configuration from environment
//! variables. All configuration is loaded at startup and validated before the
//! engine serves requests.

use std::env;
use std::sync::LazyLock;

use crate::constants::{
    DEFAULT_CONTEST_PAGE_SIZE, DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_LOCK_TIMEOUT_MS,
    DEFAULT_SUBMISSION_PAGE_SIZE,
};

/// Global engine configuration (lazily initialized)
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().expect("Failed to load configuration from environment")
});

/// Main engine configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub page: PageConfig,
    pub lock: LockConfig,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Secret shared with the push channel for signing notification tokens
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
}

/// Page sizes and pagination strategy
#[derive(Debug, Clone)]
pub struct PageConfig {
    pub submissions: i64,
    pub contests: i64,
    /// Serve submission listings with cursor pagination instead of
    /// computing full-table counts
    pub fast_pagination: bool,
}

/// Advisory lock configuration
#[derive(Debug, Clone)]
pub struct LockConfig {
    pub timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database: DatabaseConfig::from_env()?,
            session: SessionConfig::from_env()?,
            page: PageConfig::from_env()?,
            lock: LockConfig::from_env()?,
        })
    }
}

impl DatabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL".to_string()))?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| DEFAULT_DATABASE_MAX_CONNECTIONS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS".to_string()))?,
        })
    }
}

impl SessionConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            secret: env::var("SESSION_SECRET")
                .map_err(|_| ConfigError::Missing("SESSION_SECRET".to_string()))?,
        })
    }
}

impl PageConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            submissions: env::var("PAGE_SUBMISSIONS")
                .unwrap_or_else(|_| DEFAULT_SUBMISSION_PAGE_SIZE.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PAGE_SUBMISSIONS".to_string()))?,
            contests: env::var("PAGE_CONTESTS")
                .unwrap_or_else(|_| DEFAULT_CONTEST_PAGE_SIZE.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PAGE_CONTESTS".to_string()))?,
            fast_pagination: env::var("SUBMISSIONS_FAST_PAGINATION")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }
}

impl LockConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            timeout_ms: env::var("LOCK_TIMEOUT_MS")
                .unwrap_or_else(|_| DEFAULT_LOCK_TIMEOUT_MS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("LOCK_TIMEOUT_MS".to_string()))?,
        })
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        // Defaults applied when env vars are not set
        let page = PageConfig {
            submissions: DEFAULT_SUBMISSION_PAGE_SIZE,
            contests: DEFAULT_CONTEST_PAGE_SIZE,
            fast_pagination: false,
        };
        assert_eq!(page.submissions, 20);
        assert_eq!(page.contests, 20);
        assert!(!page.fast_pagination);
    }
}

//! Process configuration read from environment variables.
//!
//! | variable                 | default        |
//! |--------------------------|----------------|
//! | `PIZZERIA_BIND_ADDR`     | `0.0.0.0:8080` |
//! | `PIZZERIA_PRICE_MARGIN`  | `1.2`          |
//! | `PIZZERIA_MAX_PAGE_SIZE` | `100`          |
//! | `PIZZERIA_LOG_FORMAT`    | `json`         |
//! | `DATABASE_URL`           | unset          |
//!
//! When `DATABASE_URL` is unset the in-memory store is used.

use std::net::{Ipv4Addr, SocketAddr};

use pizzeria_menu::Margin;
use pizzeria_observability::LogFormat;
use thiserror::Error;

pub const BIND_ADDR: &str = "PIZZERIA_BIND_ADDR";
pub const PRICE_MARGIN: &str = "PIZZERIA_PRICE_MARGIN";
pub const MAX_PAGE_SIZE: &str = "PIZZERIA_MAX_PAGE_SIZE";
pub const LOG_FORMAT: &str = "PIZZERIA_LOG_FORMAT";
pub const DATABASE_URL: &str = "DATABASE_URL";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            key,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub price_margin: Margin,
    /// Upper bound applied to every requested page size.
    pub max_page_size: u32,
    pub database_url: Option<String>,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080)),
            price_margin: Margin::default(),
            max_page_size: 100,
            database_url: None,
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(raw) = get(BIND_ADDR) {
            config.bind_addr = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid(BIND_ADDR, &raw, e))?;
        }

        if let Some(raw) = get(PRICE_MARGIN) {
            config.price_margin = raw
                .parse()
                .map_err(|e| ConfigError::invalid(PRICE_MARGIN, &raw, e))?;
        }

        if let Some(raw) = get(MAX_PAGE_SIZE) {
            let size: u32 = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid(MAX_PAGE_SIZE, &raw, e))?;
            if size == 0 {
                return Err(ConfigError::invalid(MAX_PAGE_SIZE, &raw, "must be at least 1"));
            }
            config.max_page_size = size;
        }

        if let Some(raw) = get(LOG_FORMAT) {
            config.log_format = raw
                .parse()
                .map_err(|e| ConfigError::invalid(LOG_FORMAT, &raw, e))?;
        }

        config.database_url = get(DATABASE_URL);

        Ok(config)
    }
}

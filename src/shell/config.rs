// Runtime configuration read from the environment.
//
// Every key is optional. Invalid values fail at startup instead of falling back.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const HTTP_ADDR: &str = "TRACKER_HTTP_ADDR";
pub const STORE: &str = "TRACKER_STORE";
pub const DATABASE_PATH: &str = "TRACKER_DATABASE_PATH";
pub const REQUEST_TIMEOUT_MS: &str = "TRACKER_REQUEST_TIMEOUT_MS";
pub const LOG: &str = "TRACKER_LOG";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a socket address, got {value:?}")]
    InvalidAddr { key: &'static str, value: String },

    #[error("{key} must be one of memory, sqlite; got {value:?}")]
    InvalidStore { key: &'static str, value: String },

    #[error("{key} must be a positive number of milliseconds, got {value:?}")]
    InvalidTimeout { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Sqlite,
}

impl FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "sqlite" => Ok(StoreKind::Sqlite),
            _ => Err(ConfigError::InvalidStore {
                key: STORE,
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub http_addr: SocketAddr,
    pub store: StoreKind,
    pub database_path: PathBuf,
    pub request_timeout: Duration,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let http_addr = match lookup(HTTP_ADDR) {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidAddr {
                key: HTTP_ADDR,
                value,
            })?,
            None => SocketAddr::from(([0, 0, 0, 0], 8080)),
        };

        let store = match lookup(STORE) {
            Some(value) => value.parse()?,
            None => StoreKind::Memory,
        };

        let database_path = lookup(DATABASE_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/trackers.db"));

        let request_timeout = match lookup(REQUEST_TIMEOUT_MS) {
            Some(value) => match value.trim().parse::<u64>().ok() {
                Some(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    return Err(ConfigError::InvalidTimeout {
                        key: REQUEST_TIMEOUT_MS,
                        value,
                    });
                }
            },
            None => Duration::from_millis(5000),
        };

        let log_filter = lookup(LOG).unwrap_or_else(|| "info,tower_http=debug".to_string());

        Ok(Self {
            http_addr,
            store,
            database_path,
            request_timeout,
            log_filter,
        })
    }
}

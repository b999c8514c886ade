//! # Configuration Module
//!
//! Configuration is read from environment variables with defaults where
//! appropriate:
//!
//! - `LOG_LEVEL`: logging level (default: "info")
//! - `STORE_EVENT_CAPACITY`: capacity of each per-entity change channel of
//!   the in-memory store (default: 64)

use std::env;

use eyre::{Result, WrapErr};
use tracing::Level;

/// Settings for the service layer.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Log level for the application
    pub log_level: Level,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let log_level = match env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_string())
            .as_str()
        {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        Self { log_level }
    }
}

/// Settings for the backing store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Capacity of each per-entity change channel
    pub event_capacity: usize,
}

impl StoreConfig {
    pub fn from_env() -> Result<Self> {
        let event_capacity = match env::var("STORE_EVENT_CAPACITY") {
            Ok(value) => value
                .parse()
                .wrap_err("Invalid STORE_EVENT_CAPACITY value")?,
            Err(_) => meetsync_store::memory::DEFAULT_EVENT_CAPACITY,
        };

        Ok(Self { event_capacity })
    }
}

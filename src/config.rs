//! Environment configuration for the service binary.

use std::env;

use thiserror::Error;

use crate::book::SnapshotOrder;

const DEFAULT_STREAM_URL: &str = "http://localhost:8080/api/stream";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid SNAPSHOT_ORDER '{0}', expected 'insertion' or 'recency'")]
    InvalidSnapshotOrder(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub stream_url: String,
    pub bind_addr: String,
    pub snapshot_order: SnapshotOrder,
}

impl Config {
    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let stream_url =
            env::var("TRADE_STREAM_URL").unwrap_or_else(|_| DEFAULT_STREAM_URL.to_string());
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let snapshot_order = match env::var("SNAPSHOT_ORDER") {
            Ok(value) => match value.to_lowercase().as_str() {
                "insertion" => SnapshotOrder::Insertion,
                "recency" => SnapshotOrder::Recency,
                _ => return Err(ConfigError::InvalidSnapshotOrder(value)),
            },
            Err(_) => SnapshotOrder::Insertion,
        };
        Ok(Self {
            stream_url,
            bind_addr,
            snapshot_order,
        })
    }
}

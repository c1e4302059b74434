//! Client configuration from environment variables.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::FeedError;
use crate::ws::{parse_endpoint, FixedInterval, DEFAULT_RECONNECT_INTERVAL};

/// Endpoint used when `CAPTEUR_ENDPOINT` is not set.
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:9002";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

/// Configuration for automatic reconnection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Delay between reconnection attempts in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Maximum number of reconnection attempts (None for unlimited)
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_interval_ms() -> u64 {
    DEFAULT_RECONNECT_INTERVAL.as_millis() as u64
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_attempts: None,
        }
    }
}

impl ReconnectConfig {
    pub fn policy(&self) -> FixedInterval {
        FixedInterval {
            interval: Duration::from_millis(self.interval_ms),
            max_attempts: self.max_attempts,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Read configuration from the process environment.
    ///
    /// Environment variables:
    /// - `CAPTEUR_ENDPOINT`: WebSocket URL of the feed (default: "ws://localhost:9002")
    /// - `CAPTEUR_RECONNECT_INTERVAL_MS`: delay between attempts (default: 750)
    /// - `CAPTEUR_RECONNECT_MAX_ATTEMPTS`: attempt bound, unset or "0" for unlimited
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key lookup; unparseable numbers fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("CAPTEUR_ENDPOINT") {
            config.endpoint = endpoint;
        }

        if let Some(raw) = lookup("CAPTEUR_RECONNECT_INTERVAL_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) => config.reconnect.interval_ms = ms,
                Err(e) => warn!(value = %raw, error = %e, "Ignoring CAPTEUR_RECONNECT_INTERVAL_MS"),
            }
        }

        if let Some(raw) = lookup("CAPTEUR_RECONNECT_MAX_ATTEMPTS") {
            match raw.trim().parse::<u32>() {
                Ok(0) => config.reconnect.max_attempts = None,
                Ok(max) => config.reconnect.max_attempts = Some(max),
                Err(e) => warn!(value = %raw, error = %e, "Ignoring CAPTEUR_RECONNECT_MAX_ATTEMPTS"),
            }
        }

        config
    }

    /// Fail fast on an endpoint the manager would reject.
    pub fn validate(&self) -> Result<(), FeedError> {
        parse_endpoint(&self.endpoint).map(|_| ())
    }
}

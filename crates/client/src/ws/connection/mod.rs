//! Connection lifecycle types and reconnect policies.
//!
//! This module provides the shared types and includes the native
//! tokio-tungstenite transport.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::error::FeedError;

/// Lifecycle of the managed socket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// `connect` has never been called.
    #[default]
    Uninitialized,
    Connecting,
    Open,
    Closing,
    Closed,
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    /// Status line shown above the readings table.
    pub fn status_text(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "Awaiting connection...",
            ConnectionState::Open => "Connected",
            ConnectionState::Closing => "Closing...",
            ConnectionState::Closed => "Awaiting connection...",
            ConnectionState::Uninitialized => "Borked!",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status_text())
    }
}

/// Identifies one logical connection made by [`super::ConnectionManager::connect`].
///
/// Handles from an earlier connection stay valid to hold but `disconnect`
/// ignores them once the manager has moved on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionHandle {
    pub(crate) generation: u64,
    pub(crate) endpoint: Url,
}

impl ConnectionHandle {
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Parse and check a feed endpoint. Only `ws://` and `wss://` URLs with a host are accepted.
pub fn parse_endpoint(endpoint: &str) -> Result<Url, FeedError> {
    let invalid = |reason: String| FeedError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };

    let url = Url::parse(endpoint.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "ws" | "wss" => {}
        other => return Err(invalid(format!("unsupported scheme `{}`", other))),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

/// Default delay between reconnect attempts.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_millis(750);

/// Decides whether and when to try again after the connection is lost.
pub trait ReconnectPolicy: Send + Sync {
    /// Delay before reconnect attempt `attempt`, counting from 1 since the
    /// last successful open. `None` stops reconnecting.
    fn next_delay(&self, attempt: u32) -> Option<Duration>;
}

impl<P: ReconnectPolicy + ?Sized> ReconnectPolicy for Box<P> {
    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        (**self).next_delay(attempt)
    }
}

impl<P: ReconnectPolicy + ?Sized> ReconnectPolicy for Arc<P> {
    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        (**self).next_delay(attempt)
    }
}

/// Same delay before every attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedInterval {
    pub interval: Duration,
    /// Maximum number of reconnect attempts (None = retry forever)
    pub max_attempts: Option<u32>,
}

impl FixedInterval {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }
}

impl Default for FixedInterval {
    fn default() -> Self {
        Self::new(DEFAULT_RECONNECT_INTERVAL)
    }
}

impl ReconnectPolicy for FixedInterval {
    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        match self.max_attempts {
            Some(max) if attempt > max => None,
            _ => Some(self.interval),
        }
    }
}

/// Growing delay, capped at `max`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialBackoff {
    /// Delay before the first attempt
    pub initial: Duration,
    /// Upper bound for any single delay
    pub max: Duration,
    /// Multiplier applied per attempt
    pub multiplier: f32,
    /// Maximum number of reconnect attempts (None = retry forever)
    pub max_attempts: Option<u32>,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(1000),
            max: Duration::from_millis(30000),
            multiplier: 1.5,
            max_attempts: Some(10),
        }
    }
}

impl ReconnectPolicy for ExponentialBackoff {
    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if self.max_attempts.is_some_and(|max| attempt > max) {
            return None;
        }
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.initial.as_secs_f32() * self.multiplier.powi(exponent);
        let delay = Duration::try_from_secs_f32(secs).unwrap_or(self.max);
        Some(delay.min(self.max))
    }
}

mod connection_native;
pub use connection_native::{Connector, Frame, FrameStream, TransportError, TungsteniteConnector};

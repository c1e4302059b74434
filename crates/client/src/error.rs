//! Errors surfaced by the sensor feed client.

/// Errors returned synchronously to callers of the connection manager.
///
/// Transport and decode failures are recovered inside the manager and only
/// show up through [`crate::ws::ConnectionState`] and [`crate::ws::FeedEvent`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    #[error("invalid endpoint `{endpoint}`: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

//! WebSocket client for the live sensor feed.
//!
//! This module provides:
//! - A [`ConnectionManager`] owning the single feed connection, with auto-reconnect
//! - Pluggable [`ReconnectPolicy`] implementations
//! - A transport seam ([`Connector`]) with a tokio-tungstenite default
//! - Dioxus glue ([`FeedProvider`], [`use_feed`]) so pages never touch the socket
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 ConnectionManager                   │
//! │   (socket, lifecycle state, latest reading)         │
//! └─────────────────────────────────────────────────────┘
//!                         │ FeedEvent
//!          ┌──────────────┼──────────────┐
//!          ▼              ▼              ▼
//!   ┌────────────┐ ┌────────────┐ ┌────────────┐
//!   │ subscriber │ │ subscriber │ │  provider  │
//!   │  (queue)   │ │  (queue)   │ │  (signals) │
//!   └────────────┘ └────────────┘ └────────────┘
//!                                        │
//!                         ┌──────────────┼──────────────┐
//!                         ▼              ▼              ▼
//!                    Readings         Metrics     Configuration
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let manager = ConnectionManager::new();
//! let _token = manager.subscribe(|event| println!("{event:?}"));
//! let handle = manager.connect("ws://localhost:9002", FixedInterval::default())?;
//! // ...
//! manager.disconnect(&handle);
//! ```

mod connection;
mod hooks;
mod manager;

// Re-export connection types
pub use connection::{
    parse_endpoint, ConnectionHandle, ConnectionState, Connector, ExponentialBackoff,
    FixedInterval, Frame, FrameStream, ReconnectPolicy, TransportError, TungsteniteConnector,
    DEFAULT_RECONNECT_INTERVAL,
};

// Re-export manager types
pub use manager::{ConnectionManager, FeedEvent, FeedStats, SubscriptionToken};

// Re-export Dioxus glue
pub use hooks::{use_feed, FeedContext, FeedProvider};

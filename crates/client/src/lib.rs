//! Capteur Client - live sensor feed viewer
//!
//! This crate contains the connection manager for the capteur sensor feed
//! and the Dioxus desktop application that renders it.

pub mod config;
pub mod error;
pub mod ws;

pub mod components;
pub mod routes;
pub mod views;

pub use config::ClientConfig;
pub use error::FeedError;
pub use routes::Route;
pub use ws::{ConnectionManager, ConnectionState, FeedEvent};

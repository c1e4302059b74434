//! View components for the application.

pub mod configuration;
pub mod metrics;
pub mod navbar;
pub mod readings;

pub use configuration::Configuration;
pub use metrics::Metrics;
pub use navbar::NavBar;
pub use readings::Readings;

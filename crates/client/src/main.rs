//! Capteur Client - Main entry point
//!
//! A Dioxus desktop application showing the live capteur sensor feed.

#![allow(non_snake_case)]

use anyhow::Context;
use capteur_client::{config::ClientConfig, routes::Route, ws::FeedProvider};
use dioxus::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

// Assets
const MAIN_CSS: Asset = asset!("/assets/styling/main.css");

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("capteur_client=debug")),
        )
        .init();

    let config = ClientConfig::from_env();
    config
        .validate()
        .context("CAPTEUR_ENDPOINT is not a usable feed endpoint")?;
    info!(endpoint = %config.endpoint, "Starting capteur client");

    dioxus::LaunchBuilder::new().with_context(config).launch(App);
    Ok(())
}

#[component]
fn App() -> Element {
    let config = use_context::<ClientConfig>();

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        FeedProvider { config,
            Router::<Route> {}
        }
    }
}

//! Configuration page - read-only view of the feed settings.

use dioxus::prelude::*;

use crate::ws::use_feed;

#[component]
pub fn Configuration() -> Element {
    let feed = use_feed();
    let config = &feed.config;
    // Re-render when the connection changes
    let state = *feed.state.read();

    let connected_to = feed
        .manager
        .endpoint()
        .map(|url| url.to_string())
        .unwrap_or_else(|| "not connected".to_string());
    let interval = config.reconnect.interval_ms;
    let attempts = match config.reconnect.max_attempts {
        Some(max) => max.to_string(),
        None => "unlimited".to_string(),
    };
    let endpoint = &config.endpoint;

    rsx! {
        section { class: "configuration",
            table { class: "configuration__table",
                tbody {
                    tr { th { "Endpoint" } td { "{endpoint}" } }
                    tr { th { "Active connection" } td { "{connected_to}" } }
                    tr { th { "State" } td { "{state}" } }
                    tr { th { "Reconnect interval" } td { "{interval} ms" } }
                    tr { th { "Reconnect attempts" } td { "{attempts}" } }
                }
            }
        }
    }
}

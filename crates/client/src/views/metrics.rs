//! Metrics page - connection counters.

use dioxus::prelude::*;

use crate::components::feed::StatusLine;
use crate::ws::{use_feed, FeedStats};

#[component]
pub fn Metrics() -> Element {
    let feed = use_feed();
    let state = *feed.state.read();
    let sensors = feed.reading.read().as_ref().map_or(0, |r| r.len());

    let FeedStats {
        frames_decoded,
        decode_failures,
        reconnect_attempts,
    } = *feed.stats.read();

    let last_update = (*feed.last_update.read())
        .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());

    let recorded_at = feed
        .reading
        .read()
        .as_ref()
        .and_then(|r| r.recorded_at())
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| "-".to_string());

    let last_error = feed
        .last_error
        .read()
        .as_ref()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "none".to_string());

    rsx! {
        section { class: "metrics",
            StatusLine { state }
            table { class: "metrics__table",
                tbody {
                    tr { th { "Sensors" } td { "{sensors}" } }
                    tr { th { "Frames decoded" } td { "{frames_decoded}" } }
                    tr { th { "Decode failures" } td { "{decode_failures}" } }
                    tr { th { "Reconnect attempts" } td { "{reconnect_attempts}" } }
                    tr { th { "Last update" } td { "{last_update}" } }
                    tr { th { "Server timestamp" } td { "{recorded_at}" } }
                    tr { th { "Last decode error" } td { "{last_error}" } }
                }
            }
        }
    }
}

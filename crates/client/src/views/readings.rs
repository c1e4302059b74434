//! Readings page - live table of the latest sensor snapshot.

use dioxus::prelude::*;

use crate::components::feed::{SensorTable, StatusLine};
use crate::ws::use_feed;

#[component]
pub fn Readings() -> Element {
    let feed = use_feed();
    let state = *feed.state.read();
    let reading = feed.reading.read().clone();

    // Dim stale data while the feed is down
    let opacity = if state.is_open() { "1" } else { "0.5" };

    rsx! {
        header { class: "readings",
            StatusLine { state }
            div { style: "opacity: {opacity}",
                if let Some(reading) = reading {
                    SensorTable { reading }
                } else {
                    div { class: "readings__empty", "No sensors to read..." }
                }
            }
        }
    }
}

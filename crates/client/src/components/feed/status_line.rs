//! Status line - shows the human readable connection state.

use dioxus::prelude::*;

use crate::ws::ConnectionState;

#[derive(Props, Clone, PartialEq)]
pub struct StatusLineProps {
    pub state: ConnectionState,
}

#[component]
pub fn StatusLine(props: StatusLineProps) -> Element {
    let color_class = match props.state {
        ConnectionState::Open => "status--open",
        ConnectionState::Connecting | ConnectionState::Closed => "status--waiting",
        ConnectionState::Closing => "status--closing",
        ConnectionState::Uninitialized => "status--broken",
    };
    let text = props.state.status_text();

    rsx! {
        div { class: "status {color_class}",
            "Status:"
            br {}
            b { "{text}" }
        }
    }
}

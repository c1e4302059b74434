//! Application routing configuration.

use dioxus::prelude::*;

use crate::views::{Configuration, Metrics, NavBar, Readings};

// Router configuration
#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(NavBar)]
        #[route("/")]
        Readings {},
        #[route("/metrics")]
        Metrics {},
        #[route("/configuration")]
        Configuration {},
}

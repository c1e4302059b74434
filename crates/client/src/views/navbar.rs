//! Navigation bar layout shared by every page.

use dioxus::prelude::*;

use crate::routes::Route;

/// The navigation bar rendered above every page.
#[component]
pub fn NavBar() -> Element {
    let route: Route = use_route();

    rsx! {
        nav { class: "mx-auto",
            div { class: "navbar",
                div { class: "navbar__logo", "Capteur" }
                div { class: "navbar__items",
                    Link {
                        to: Route::Readings {},
                        class: if matches!(route, Route::Readings {}) { "active" } else { "" },
                        "Readings"
                    }
                    Link {
                        to: Route::Metrics {},
                        class: if matches!(route, Route::Metrics {}) { "active" } else { "" },
                        "Metrics"
                    }
                    Link {
                        to: Route::Configuration {},
                        class: if matches!(route, Route::Configuration {}) { "active" } else { "" },
                        "Configuration"
                    }
                }
            }
        }

        Outlet::<Route> {}
    }
}

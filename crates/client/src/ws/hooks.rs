//! Dioxus glue for the sensor feed.
//!
//! NOTE: Pages never talk to the socket. [`FeedProvider`] owns the one
//! [`ConnectionManager`], mirrors its events into signals, and pages read
//! those signals through [`use_feed`].

use std::rc::Rc;
use std::sync::Arc;

use capteur_shared::{DecodeError, Reading};
use chrono::{DateTime, Local};
use dioxus::prelude::*;
use futures_channel::mpsc::{unbounded, UnboundedReceiver};
use futures_util::StreamExt;
use tracing::error;

use super::connection::{ConnectionHandle, ConnectionState};
use super::manager::{ConnectionManager, FeedEvent, FeedStats};
use crate::config::ClientConfig;

/// Feed context provided to every page.
#[derive(Clone)]
pub struct FeedContext {
    pub manager: ConnectionManager,
    pub config: ClientConfig,
    pub state: Signal<ConnectionState>,
    pub reading: Signal<Option<Arc<Reading>>>,
    pub last_error: Signal<Option<DecodeError>>,
    pub stats: Signal<FeedStats>,
    /// Local time the latest reading arrived
    pub last_update: Signal<Option<DateTime<Local>>>,
}

/// Provider component that owns the feed connection for the whole app.
#[component]
pub fn FeedProvider(config: ClientConfig, children: Element) -> Element {
    let manager = use_hook(ConnectionManager::new);
    let state = use_signal(|| manager.current_state());
    let reading = use_signal(|| manager.current_reading());
    let last_error = use_signal(|| None::<DecodeError>);
    let stats = use_signal(|| manager.stats());
    let last_update = use_signal(|| None::<DateTime<Local>>);

    let ctx = use_context_provider(|| FeedContext {
        manager: manager.clone(),
        config: config.clone(),
        state,
        reading,
        last_error,
        stats,
        last_update,
    });

    // Subscribe before connecting so the first Connecting state is seen
    let _subscription = use_hook({
        let ctx = ctx.clone();
        move || {
            let (tx, rx) = unbounded::<FeedEvent>();
            let token = ctx.manager.subscribe(move |event| {
                let _ = tx.unbounded_send(event.clone());
            });
            spawn(forward_events(rx, ctx));
            Rc::new(token)
        }
    });

    let handle = use_hook({
        let ctx = ctx.clone();
        move || -> Option<ConnectionHandle> {
            let policy = ctx.config.reconnect.policy();
            match ctx.manager.connect(&ctx.config.endpoint, policy) {
                Ok(handle) => Some(handle),
                Err(err) => {
                    error!(%err, "Cannot connect to sensor feed");
                    None
                }
            }
        }
    });

    use_drop({
        let manager = ctx.manager.clone();
        move || {
            if let Some(handle) = handle {
                manager.disconnect(&handle);
            }
        }
    });

    children
}

/// Copy feed events into the context signals on the UI task.
async fn forward_events(mut rx: UnboundedReceiver<FeedEvent>, mut ctx: FeedContext) {
    while let Some(event) = rx.next().await {
        match event {
            FeedEvent::StateChanged(state) => ctx.state.set(state),
            FeedEvent::ReadingUpdated(reading) => {
                ctx.reading.set(Some(reading));
                ctx.last_update.set(Some(Local::now()));
            }
            FeedEvent::DecodeFailed(err) => ctx.last_error.set(Some(err)),
        }
        ctx.stats.set(ctx.manager.stats());
    }
}

/// Hook to get the feed context.
///
/// # Returns
/// The context provided by the nearest [`FeedProvider`]; signals inside are reactive.
pub fn use_feed() -> FeedContext {
    use_context::<FeedContext>()
}

//! Connection manager for the sensor feed.
//!
//! Owns the one live socket, reconnects according to a [`ReconnectPolicy`],
//! decodes every frame and publishes the latest state and reading to
//! subscribers.

use std::collections::{BTreeMap, VecDeque};
use std::mem;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use capteur_shared::{DecodeError, Message, Reading};
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};
use tokio::sync::mpsc::{channel, Receiver, Sender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use super::connection::{
    parse_endpoint, ConnectionHandle, ConnectionState, Connector, Frame, ReconnectPolicy,
    TungsteniteConnector,
};
use crate::error::FeedError;

/// Everything a subscriber can observe.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// The connection moved to a new lifecycle state
    StateChanged(ConnectionState),
    /// A frame decoded successfully and replaced the latest reading
    ReadingUpdated(Arc<Reading>),
    /// A frame could not be decoded; the latest reading is unchanged
    DecodeFailed(DecodeError),
}

/// Counters shown on the metrics page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    pub frames_decoded: u64,
    pub decode_failures: u64,
    pub reconnect_attempts: u64,
}

/// Handle to the sensor feed. Cheap to clone; all clones share one connection.
///
/// `connect` and `subscribe` spawn Tokio tasks and must be called from
/// within a Tokio runtime.
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

struct Inner {
    connector: Arc<dyn Connector>,
    shared: Mutex<Shared>,
    next_subscriber: AtomicU64,
}

struct ActiveConnection {
    handle: ConnectionHandle,
    task: JoinHandle<()>,
}

/// Events queued per subscriber before later ones are coalesced.
const SUBSCRIBER_QUEUE_DEPTH: usize = 64;

struct Subscriber {
    id: u64,
    sender: Sender<FeedEvent>,
    backlog: Arc<Mutex<Backlog>>,
}

impl Subscriber {
    /// Queue `event`, or fold it into the backlog once the queue is full.
    fn offer(&self, event: FeedEvent) {
        let mut backlog = self.backlog.lock().unwrap_or_else(PoisonError::into_inner);
        // Anything behind a non-empty backlog must wait its turn there
        if !backlog.is_empty() {
            backlog.push(event);
            return;
        }
        match self.sender.try_send(event) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(event)) => {
                warn!(subscriber = self.id, "Subscriber is lagging, coalescing events");
                backlog.push(event);
            }
        }
    }
}

/// Newest event of each kind that did not fit in a subscriber's queue.
#[derive(Default)]
struct Backlog {
    events: VecDeque<FeedEvent>,
}

impl Backlog {
    fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn push(&mut self, event: FeedEvent) {
        let kind = mem::discriminant(&event);
        self.events.retain(|queued| mem::discriminant(queued) != kind);
        self.events.push_back(event);
    }

    fn take(&mut self) -> VecDeque<FeedEvent> {
        mem::take(&mut self.events)
    }
}

/// Next batch for a delivery loop: queued events first, then the backlog.
/// `None` once the manager or the token let go of the sender.
fn next_batch(
    receiver: &mut Receiver<FeedEvent>,
    backlog: &Mutex<Backlog>,
) -> Option<VecDeque<FeedEvent>> {
    {
        // Holding the backlog lock makes the empty check and the take atomic
        // with respect to `Subscriber::offer`
        let mut backlog = backlog.lock().unwrap_or_else(PoisonError::into_inner);
        match receiver.try_recv() {
            Ok(event) => return Some(VecDeque::from([event])),
            Err(TryRecvError::Disconnected) => return None,
            Err(TryRecvError::Empty) if !backlog.is_empty() => return Some(backlog.take()),
            Err(TryRecvError::Empty) => {}
        }
    }
    receiver.blocking_recv().map(|event| VecDeque::from([event]))
}

/// Single-writer state. Every mutation happens under the one mutex in [`Inner`].
#[derive(Default)]
struct Shared {
    state: ConnectionState,
    reading: Option<Arc<Reading>>,
    stats: FeedStats,
    last_generation: u64,
    active: Option<ActiveConnection>,
    subscribers: BTreeMap<u64, Subscriber>,
}

impl Shared {
    fn is_current(&self, generation: u64) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.handle.generation == generation)
    }

    fn publish(&self, event: FeedEvent) {
        for subscriber in self.subscribers.values() {
            subscriber.offer(event.clone());
        }
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state == state {
            return;
        }
        debug!(from = ?self.state, to = ?state, "Connection state changed");
        self.state = state;
        self.publish(FeedEvent::StateChanged(state));
    }

    /// Apply a transition for `generation`. Returns false when the generation is stale.
    fn transition(&mut self, generation: u64, state: ConnectionState) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.set_state(state);
        true
    }

    fn apply_frame(&mut self, generation: u64, decoded: Result<Message, DecodeError>) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        match decoded {
            Ok(message) => {
                let reading = Arc::new(message.into_reading());
                debug!(sensors = reading.len(), "Decoded sensor reading");
                self.stats.frames_decoded += 1;
                self.reading = Some(reading.clone());
                self.publish(FeedEvent::ReadingUpdated(reading));
            }
            Err(err) => {
                warn!(%err, "Dropping undecodable frame");
                self.stats.decode_failures += 1;
                self.publish(FeedEvent::DecodeFailed(err));
            }
        }
        true
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        // Callbacks never run under this lock
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let shared = self.shared.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(active) = shared.active.take() {
            active.task.abort();
        }
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionManager {
    /// Manager using the tokio-tungstenite transport.
    pub fn new() -> Self {
        Self::with_connector(Arc::new(TungsteniteConnector))
    }

    /// Manager using a custom transport.
    pub fn with_connector(connector: Arc<dyn Connector>) -> Self {
        Self {
            inner: Arc::new(Inner {
                connector,
                shared: Mutex::new(Shared::default()),
                next_subscriber: AtomicU64::new(1),
            }),
        }
    }

    /// Connect to `endpoint`, reconnecting according to `policy`.
    ///
    /// Returns the existing handle if already connected to the same endpoint.
    /// A different endpoint replaces the current connection.
    pub fn connect(
        &self,
        endpoint: &str,
        policy: impl ReconnectPolicy + 'static,
    ) -> Result<ConnectionHandle, FeedError> {
        let endpoint = parse_endpoint(endpoint)?;
        let mut shared = self.inner.lock();

        if let Some(active) = &shared.active {
            if active.handle.endpoint == endpoint {
                debug!(%endpoint, "Already connected, reusing handle");
                return Ok(active.handle.clone());
            }
        }
        if let Some(previous) = shared.active.take() {
            info!(from = %previous.handle.endpoint, to = %endpoint, "Switching sensor feed endpoint");
            previous.task.abort();
            shared.set_state(ConnectionState::Closed);
        }

        shared.last_generation += 1;
        let handle = ConnectionHandle {
            generation: shared.last_generation,
            endpoint,
        };
        shared.set_state(ConnectionState::Connecting);

        let task = ConnectionTask {
            inner: Arc::downgrade(&self.inner),
            connector: self.inner.connector.clone(),
            handle: handle.clone(),
            policy: Box::new(policy),
        };
        // The task cannot touch `shared` until this guard is released, so it
        // always finds itself registered as the active connection.
        let join = tokio::spawn(task.run());
        shared.active = Some(ActiveConnection {
            handle: handle.clone(),
            task: join,
        });

        info!(endpoint = %handle.endpoint, "Connecting to sensor feed");
        Ok(handle)
    }

    /// Tear down the connection and stop reconnecting. Stale handles are ignored.
    pub fn disconnect(&self, handle: &ConnectionHandle) {
        let mut shared = self.inner.lock();
        if !shared.is_current(handle.generation) {
            debug!(endpoint = %handle.endpoint, "Disconnect for inactive handle ignored");
            return;
        }
        if let Some(active) = shared.active.take() {
            active.task.abort();
        }
        shared.set_state(ConnectionState::Closed);
        info!(endpoint = %handle.endpoint, "Disconnected from sensor feed");
    }

    pub fn current_state(&self) -> ConnectionState {
        self.inner.lock().state
    }

    pub fn current_reading(&self) -> Option<Arc<Reading>> {
        self.inner.lock().reading.clone()
    }

    /// Endpoint of the active connection, if any.
    pub fn endpoint(&self) -> Option<Url> {
        self.inner
            .lock()
            .active
            .as_ref()
            .map(|active| active.handle.endpoint.clone())
    }

    pub fn stats(&self) -> FeedStats {
        self.inner.lock().stats
    }

    /// Register `callback` for every state and reading change.
    ///
    /// Events are queued per subscriber and delivered on a blocking-pool
    /// thread, in the order the manager applied them, so a callback may block
    /// without holding up the transport. A subscriber that falls more than
    /// `SUBSCRIBER_QUEUE_DEPTH` events behind gets only the newest event of
    /// each kind for the overflow. A panicking callback is logged and keeps
    /// receiving later events. Dropping the token unsubscribes.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionToken
    where
        F: Fn(&FeedEvent) + Send + 'static,
    {
        let id = self.inner.next_subscriber.fetch_add(1, Ordering::Relaxed);
        let active = Arc::new(AtomicBool::new(true));
        let (sender, mut receiver) = channel::<FeedEvent>(SUBSCRIBER_QUEUE_DEPTH);
        let backlog = Arc::new(Mutex::new(Backlog::default()));

        let delivering = active.clone();
        let pending = backlog.clone();
        tokio::task::spawn_blocking(move || {
            'deliver: while let Some(batch) = next_batch(&mut receiver, &pending) {
                for event in batch {
                    if !delivering.load(Ordering::SeqCst) {
                        break 'deliver;
                    }
                    if catch_unwind(AssertUnwindSafe(|| callback(&event))).is_err() {
                        warn!(subscriber = id, "Subscriber callback panicked");
                    }
                }
            }
            debug!(subscriber = id, "Subscriber delivery stopped");
        });

        self.inner.lock().subscribers.insert(
            id,
            Subscriber {
                id,
                sender,
                backlog,
            },
        );

        SubscriptionToken {
            id,
            active,
            inner: Arc::downgrade(&self.inner),
        }
    }
}

/// Keeps a subscription alive. Dropping it unsubscribes.
#[must_use = "dropping the token unsubscribes immediately"]
pub struct SubscriptionToken {
    id: u64,
    active: Arc<AtomicBool>,
    inner: Weak<Inner>,
}

impl SubscriptionToken {
    pub fn unsubscribe(self) {}
}

impl Drop for SubscriptionToken {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(inner) = self.inner.upgrade() {
            inner.lock().subscribers.remove(&self.id);
        }
    }
}

/// Connect/read/reconnect loop for one generation.
struct ConnectionTask {
    inner: Weak<Inner>,
    connector: Arc<dyn Connector>,
    handle: ConnectionHandle,
    policy: Box<dyn ReconnectPolicy>,
}

impl ConnectionTask {
    /// Run `f` against the shared state. False when the manager is gone or
    /// `f` reports this generation as stale.
    fn update(&self, f: impl FnOnce(&mut Shared) -> bool) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let mut shared = inner.lock();
        f(&mut shared)
    }

    fn transition(&self, state: ConnectionState) -> bool {
        let generation = self.handle.generation;
        self.update(|shared| shared.transition(generation, state))
    }

    async fn run(self) {
        let endpoint = &self.handle.endpoint;
        let generation = self.handle.generation;
        let mut attempt = 0u32;

        loop {
            if !self.transition(ConnectionState::Connecting) {
                return;
            }

            match self.connector.connect(endpoint).await {
                Ok(mut stream) => {
                    if !self.transition(ConnectionState::Open) {
                        return;
                    }
                    attempt = 0;
                    info!(%endpoint, "Sensor feed connected");

                    loop {
                        let decoded = match stream.next_frame().await {
                            Some(Ok(Frame::Text(text))) => Message::decode(&text),
                            Some(Ok(Frame::Binary(bytes))) => Message::decode_bytes(&bytes),
                            Some(Ok(Frame::Close)) => {
                                info!(%endpoint, "Sensor feed sent close frame");
                                if !self.transition(ConnectionState::Closing) {
                                    return;
                                }
                                break;
                            }
                            Some(Err(err)) => {
                                warn!(%endpoint, %err, "Sensor feed transport error");
                                break;
                            }
                            None => {
                                info!(%endpoint, "Sensor feed closed");
                                break;
                            }
                        };
                        if !self.update(|shared| shared.apply_frame(generation, decoded)) {
                            return;
                        }
                    }
                }
                Err(err) => {
                    warn!(%endpoint, %err, "Could not reach sensor feed");
                }
            }

            if !self.transition(ConnectionState::Closed) {
                return;
            }

            attempt = attempt.saturating_add(1);
            let Some(delay) = self.policy.next_delay(attempt) else {
                info!(%endpoint, attempts = attempt - 1, "Reconnect policy exhausted, giving up");
                self.update(|shared| {
                    if shared.is_current(generation) {
                        shared.active = None;
                    }
                    true
                });
                return;
            };

            self.update(|shared| {
                let current = shared.is_current(generation);
                if current {
                    shared.stats.reconnect_attempts += 1;
                }
                current
            });
            debug!(%endpoint, attempt, delay_ms = delay.as_millis() as u64, "Scheduling reconnect");
            tokio::time::sleep(delay).await;
        }
    }
}

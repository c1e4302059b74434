//! Shared test doubles for the connection manager.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use capteur_client::ws::{
    ConnectionManager, ConnectionState, Connector, FeedEvent, Frame, FrameStream,
    SubscriptionToken, TransportError,
};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use url::Url;

pub const SAMPLE_FRAME: &str = r#"{"reading":{"sensors":{"temp":{"measurement":{"value":21.5,"unit":"C"}},"door":{"boolean":{"value":true}}}}}"#;

pub type FrameSender = UnboundedSender<Result<Frame, TransportError>>;

/// Frame stream fed from a test-owned channel. Dropping the sender ends the stream.
struct ChannelStream {
    frames: UnboundedReceiver<Result<Frame, TransportError>>,
}

#[async_trait]
impl FrameStream for ChannelStream {
    async fn next_frame(&mut self) -> Option<Result<Frame, TransportError>> {
        self.frames.recv().await
    }
}

enum Script {
    Accept(UnboundedReceiver<Result<Frame, TransportError>>),
    Refuse,
}

/// Connector that plays back scripted outcomes, refusing once the script runs out.
#[derive(Default)]
pub struct ScriptedConnector {
    scripts: StdMutex<VecDeque<Script>>,
    connects: StdMutex<Vec<Url>>,
}

impl ScriptedConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a successful connection and return the sender that feeds it.
    pub fn accept(&self) -> FrameSender {
        let (tx, rx) = unbounded_channel();
        self.scripts.lock().unwrap().push_back(Script::Accept(rx));
        tx
    }

    pub fn refuse(&self) {
        self.scripts.lock().unwrap().push_back(Script::Refuse);
    }

    pub fn connect_count(&self) -> usize {
        self.connects.lock().unwrap().len()
    }

    pub fn endpoints(&self) -> Vec<Url> {
        self.connects.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, endpoint: &Url) -> Result<Box<dyn FrameStream>, TransportError> {
        self.connects.lock().unwrap().push(endpoint.clone());
        match self.scripts.lock().unwrap().pop_front() {
            Some(Script::Accept(frames)) => Ok(Box::new(ChannelStream { frames })),
            Some(Script::Refuse) | None => {
                Err(TransportError::Connect("connection refused".to_string()))
            }
        }
    }
}

/// Subscriber that records every event with the time it was delivered.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<StdMutex<Vec<(Instant, FeedEvent)>>>,
}

impl Recorder {
    pub fn attach(&self, manager: &ConnectionManager) -> SubscriptionToken {
        let events = self.events.clone();
        manager.subscribe(move |event| {
            events.lock().unwrap().push((Instant::now(), event.clone()));
        })
    }

    pub fn push(&self, event: FeedEvent) {
        self.events.lock().unwrap().push((Instant::now(), event));
    }

    pub fn events(&self) -> Vec<FeedEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(_, e)| e.clone())
            .collect()
    }

    pub fn timed_events(&self) -> Vec<(Instant, FeedEvent)> {
        self.events.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn states(&self) -> Vec<ConnectionState> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                FeedEvent::StateChanged(state) => Some(state),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&FeedEvent) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }

    /// Wait until `cond` holds for the recorded events.
    pub async fn wait_for(&self, cond: impl Fn(&[FeedEvent]) -> bool) {
        let events = self.clone();
        eventually(move || cond(&events.events())).await;
    }
}

/// Poll `cond` until it holds, panicking after two seconds.
pub async fn eventually(cond: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !cond() {
        assert!(Instant::now() < deadline, "condition not met within 2s");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Let spawned tasks run for a moment.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

pub fn text(payload: &str) -> Result<Frame, TransportError> {
    Ok(Frame::Text(payload.to_string()))
}

pub fn reading_frame(sensor: &str, value: f64) -> Result<Frame, TransportError> {
    text(&format!(
        r#"{{"reading":{{"sensors":{{"{sensor}":{{"measurement":{{"value":{value},"unit":"C"}}}}}}}}}}"#
    ))
}

pub async fn with_timeout<T>(fut: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(5), fut)
        .await
        .expect("timed out")
}

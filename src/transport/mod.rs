//! Inbound event source seen by the core: `(topic, payload, retained)` tuples
//! pushed into a bounded channel until cancelled.

pub mod mqtt;

use crate::errors::AppResult;
use std::future::Future;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub use mqtt::MqttSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    pub retained: bool,
}

impl InboundMessage {
    pub fn live(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            retained: false,
        }
    }

    pub fn retained(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            retained: true,
            ..Self::live(topic, payload)
        }
    }
}

/// Subscription bookkeeping for one run. Owned by the orchestrator and handed
/// to the source, which updates it from its connect handler.
#[derive(Debug, Default, Clone)]
pub struct SessionState {
    pub connected: bool,
    pub subscribed: bool,
    /// Number of (re)connections acknowledged by the broker during the run.
    pub connects: u32,
    pub delivered: u64,
}

impl SessionState {
    /// Record a broker acknowledgement. Returns `true` when a subscription must
    /// be (re)issued: a fresh session has no subscriptions.
    pub fn on_connect(&mut self, session_present: bool) -> bool {
        self.connected = true;
        self.connects += 1;
        if session_present && self.subscribed {
            return false;
        }
        self.subscribed = false;
        true
    }

    pub fn on_subscribed(&mut self) {
        self.subscribed = true;
    }

    pub fn on_disconnect(&mut self) {
        self.connected = false;
    }
}

/// Push one message into the pipeline. `false` when the run is over: either
/// cancelled while waiting for room, or the receiver is gone.
pub async fn forward(
    tx: &mpsc::Sender<InboundMessage>,
    msg: InboundMessage,
    cancel: &CancellationToken,
) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        sent = tx.send(msg) => sent.is_ok(),
    }
}

/// Producer side of the event pipeline.
///
/// `run` delivers messages into `tx` until `cancel` fires and then returns,
/// dropping `tx`. A source that fails early returns its error; the run still
/// completes its budget with whatever was delivered.
pub trait EventSource {
    fn run(
        self,
        session: &mut SessionState,
        tx: mpsc::Sender<InboundMessage>,
        cancel: CancellationToken,
    ) -> impl Future<Output = AppResult<()>>;
}

//! WebSocket client connection state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use pulse_core::{ConnectionId, ServerEvent};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Lifecycle of a client connection.
///
/// `Closed` is terminal; no transition leaves it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// Transport link accepted, greeting not yet delivered.
    Connecting,
    /// Fully established; eligible for heartbeats and broadcasts.
    Open,
    /// Teardown in progress.
    Closing,
    /// Fully torn down.
    Closed,
}

/// Represents a connected dashboard client.
///
/// Owns the send half of the connection's outbound channel, its
/// subscription set, and the cancellation token of its heartbeat probe.
/// The subscription set is append-only and keeps duplicates; there is no
/// unsubscribe operation.
pub struct ClientConnection {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Send channel to the connection's socket write task.
    tx: mpsc::Sender<Arc<String>>,
    /// Lifecycle state.
    state: Mutex<ConnectionState>,
    /// Subscribed channels, in subscription order.
    subscriptions: Mutex<Vec<String>>,
    /// Heartbeat cancellation token; `Some` only while Connecting/Open.
    heartbeat: Mutex<Option<CancellationToken>>,
    /// When this connection was established.
    pub connected_at: Instant,
    /// Count of messages dropped due to a full or closed channel.
    dropped_messages: AtomicU64,
}

impl ClientConnection {
    /// Create a new connection in the `Connecting` state.
    pub fn new(id: ConnectionId, tx: mpsc::Sender<Arc<String>>) -> Self {
        Self {
            id,
            tx,
            state: Mutex::new(ConnectionState::Connecting),
            subscriptions: Mutex::new(Vec::new()),
            heartbeat: Mutex::new(None),
            connected_at: Instant::now(),
            dropped_messages: AtomicU64::new(0),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    /// Whether the connection is fully established.
    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Complete the handshake: `Connecting` → `Open`.
    ///
    /// A no-op from any other state (the connection may already be
    /// tearing down).
    pub fn mark_open(&self) {
        let mut state = self.state.lock();
        if *state == ConnectionState::Connecting {
            *state = ConnectionState::Open;
        }
    }

    /// Attach the heartbeat cancellation token.
    ///
    /// Called exactly once, at registration time. If the connection is
    /// already past `Open` the token is cancelled on the spot so no probe
    /// can outlive the connection.
    pub fn attach_heartbeat(&self, token: CancellationToken) {
        let state = self.state.lock();
        let mut heartbeat = self.heartbeat.lock();
        if heartbeat.is_some() {
            warn!(conn_id = %self.id, "heartbeat already attached, cancelling extra probe");
            token.cancel();
            return;
        }
        match *state {
            ConnectionState::Connecting | ConnectionState::Open => *heartbeat = Some(token),
            ConnectionState::Closing | ConnectionState::Closed => token.cancel(),
        }
    }

    /// Begin teardown: transition to `Closing` and cancel the heartbeat.
    ///
    /// Returns `true` to exactly one caller; every later call (second
    /// close signal, racing error path) observes `Closing`/`Closed` and
    /// gets `false`. This is the at-most-once cleanup guard.
    pub fn begin_close(&self) -> bool {
        let mut state = self.state.lock();
        match *state {
            ConnectionState::Closing | ConnectionState::Closed => false,
            ConnectionState::Connecting | ConnectionState::Open => {
                *state = ConnectionState::Closing;
                if let Some(token) = self.heartbeat.lock().take() {
                    token.cancel();
                }
                true
            }
        }
    }

    /// Complete teardown: `Closing` → `Closed` (terminal).
    pub fn finish_close(&self) {
        let mut state = self.state.lock();
        if *state == ConnectionState::Closing {
            *state = ConnectionState::Closed;
        }
    }

    /// Append a channel to the subscription set. Duplicates are kept.
    pub fn subscribe(&self, channel: String) {
        self.subscriptions.lock().push(channel);
    }

    /// The current subscription list, in subscription order.
    pub fn subscriptions(&self) -> Vec<String> {
        self.subscriptions.lock().clone()
    }

    /// Apply the delivery rule for a channel-tagged (or untagged) event.
    ///
    /// Open connections with no subscriptions receive everything; once at
    /// least one channel is subscribed, tagged events are delivered only
    /// for subscribed channels. Untagged events always deliver.
    pub fn should_receive(&self, channel: Option<&str>) -> bool {
        if !self.is_open() {
            return false;
        }
        match channel {
            None => true,
            Some(channel) => {
                let subscriptions = self.subscriptions.lock();
                subscriptions.is_empty() || subscriptions.iter().any(|s| s == channel)
            }
        }
    }

    /// Send a serialized frame to the client.
    ///
    /// Returns `false` if the channel is full or closed, and increments
    /// the dropped message counter.
    pub fn send(&self, message: Arc<String>) -> bool {
        if self.tx.try_send(message).is_ok() {
            true
        } else {
            let _ = self.dropped_messages.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Serialize an event and send it to the client.
    pub fn send_event(&self, event: &ServerEvent) -> bool {
        match serde_json::to_string(event) {
            Ok(json) => self.send(Arc::new(json)),
            Err(_) => false,
        }
    }

    /// Total messages dropped for this connection.
    pub fn drop_count(&self) -> u64 {
        self.dropped_messages.load(Ordering::Relaxed)
    }

    /// Connection age.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

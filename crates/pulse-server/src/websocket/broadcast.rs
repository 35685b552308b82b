//! Event fan-out to connected dashboard clients.

use std::sync::Arc;

use metrics::counter;
use pulse_core::{MetricsSnapshot, ServerEvent, TestResult};
use tracing::{debug, warn};

use super::registry::ConnectionRegistry;

/// Fans server events out to the matching subset of open connections.
///
/// Constructed once at server startup around the shared registry; the
/// surrounding CRUD/aggregation layers publish through
/// [`publish_test_result`](Broadcaster::publish_test_result) and
/// [`publish_metrics_update`](Broadcaster::publish_metrics_update).
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
}

impl Broadcaster {
    /// Create a broadcaster over the given registry.
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Publish an event to every open connection the delivery rule selects.
    ///
    /// The payload is serialized once and shared across recipients. Each
    /// per-connection send is an independent bounded enqueue: a full or
    /// closed channel on one connection never aborts delivery to the rest,
    /// and a slow client never blocks the publisher.
    pub async fn publish(&self, event: &ServerEvent) {
        let json = match serde_json::to_string(event) {
            Ok(json) => Arc::new(json),
            Err(error) => {
                warn!(event_type = event.event_type(), %error, "failed to serialize event, dropping");
                return;
            }
        };

        let snapshot = self.registry.snapshot().await;
        let mut recipients = 0u32;
        for connection in &snapshot {
            if !connection.should_receive(event.channel()) {
                continue;
            }
            recipients += 1;
            if !connection.send(Arc::clone(&json)) {
                counter!("ws_broadcast_drops_total").increment(1);
                warn!(
                    conn_id = %connection.id,
                    total_drops = connection.drop_count(),
                    "failed to send event to client (channel full or closed)"
                );
            }
        }
        counter!("ws_broadcast_events_total").increment(1);
        debug!(
            event_type = event.event_type(),
            channel = event.channel().unwrap_or("-"),
            recipients,
            "broadcast event"
        );
    }

    /// Publish a test-result notification on the `tests` channel.
    pub async fn publish_test_result(&self, result: TestResult) {
        self.publish(&ServerEvent::test_result(result)).await;
    }

    /// Publish a metrics refresh on the `metrics` channel.
    pub async fn publish_metrics_update(&self, snapshot: MetricsSnapshot) {
        self.publish(&ServerEvent::metrics(snapshot)).await;
    }
}

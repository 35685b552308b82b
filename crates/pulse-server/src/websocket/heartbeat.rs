//! Periodic liveness probes for open connections.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use pulse_core::ServerEvent;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::connection::ClientConnection;

/// Outcome of the heartbeat loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatResult {
    /// The probe observed a non-open connection and stopped itself.
    Stopped,
    /// The probe was cancelled externally (connection teardown).
    Cancelled,
}

/// Run the repeating heartbeat probe for one connection.
///
/// On each `period` tick: if the connection is still open, a `heartbeat`
/// event with the current RFC 3339 timestamp is sent; otherwise the loop
/// stops itself. The interval's immediate first tick is skipped, so a
/// connection open for duration `T` observes `floor(T / period)` probes.
///
/// The caller attaches the `cancel` token to the connection at
/// registration time; teardown cancels it on every exit path, and
/// cancelling an already-finished probe is a no-op.
pub async fn run_heartbeat(
    connection: Arc<ClientConnection>,
    period: Duration,
    cancel: CancellationToken,
) -> HeartbeatResult {
    let mut ticks = time::interval(period);
    // The first tick completes immediately; the first probe belongs one
    // full period out.
    let _ = ticks.tick().await;

    loop {
        tokio::select! {
            _ = ticks.tick() => {
                if !connection.is_open() {
                    debug!(conn_id = %connection.id, "connection no longer open, stopping heartbeat");
                    return HeartbeatResult::Stopped;
                }
                if connection.send_event(&ServerEvent::heartbeat_now()) {
                    counter!("ws_heartbeats_sent_total").increment(1);
                }
            }
            () = cancel.cancelled() => {
                return HeartbeatResult::Cancelled;
            }
        }
    }
}

//! WebSocket session lifecycle — handles a single connected client from
//! upgrade through disconnect.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge, histogram};
use pulse_core::{ConnectionId, ServerEvent};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use super::connection::ClientConnection;
use super::heartbeat::run_heartbeat;
use super::registry::ConnectionRegistry;
use super::subscription::handle_client_message;

/// Outbound channel depth per connection. Sends beyond this are dropped
/// rather than blocking the publisher.
const OUTBOUND_BUFFER: usize = 1024;

/// Run a WebSocket session for a connected client.
///
/// 1. Registers the connection (still `Connecting`)
/// 2. Enqueues the greeting — the ordered outbound channel guarantees it
///    is the first frame the client ever sees
/// 3. Transitions to `Open` and starts the heartbeat probe
/// 4. Pumps inbound frames through the subscription handler
/// 5. On close frame or transport error, tears down exactly once:
///    heartbeat cancelled, connection unregistered, state `Closed`
#[instrument(skip_all, fields(conn_id = %id))]
pub async fn run_ws_session(
    ws: WebSocket,
    id: ConnectionId,
    registry: Arc<ConnectionRegistry>,
    heartbeat_period: Duration,
) {
    let (mut ws_tx, mut ws_rx) = ws.split();

    let (send_tx, mut send_rx) = mpsc::channel::<Arc<String>>(OUTBOUND_BUFFER);
    let connection = Arc::new(ClientConnection::new(id.clone(), send_tx));

    let session_start = Instant::now();
    info!("client connected");
    counter!("ws_connections_total").increment(1);
    gauge!("ws_connections_active").increment(1.0);

    if let Err(error) = registry.register(connection.clone()).await {
        error!(%error, "refusing connection");
        gauge!("ws_connections_active").decrement(1.0);
        return;
    }

    // Greeting first, before the heartbeat can tick and before any inbound
    // frame is processed.
    if !connection.send_event(&ServerEvent::greeting()) {
        warn!("failed to enqueue greeting");
    }
    connection.mark_open();

    let cancel = CancellationToken::new();
    connection.attach_heartbeat(cancel.clone());
    let heartbeat = tokio::spawn(run_heartbeat(
        connection.clone(),
        heartbeat_period,
        cancel,
    ));

    // Outbound forwarder: ordered per-connection channel → socket sink.
    let outbound = tokio::spawn(async move {
        while let Some(text) = send_rx.recv().await {
            if ws_tx
                .send(Message::Text((*text).clone().into()))
                .await
                .is_err()
            {
                break;
            }
        }
    });

    // Process incoming frames until close or transport error.
    while let Some(Ok(frame)) = ws_rx.next().await {
        match frame {
            Message::Text(text) => handle_client_message(&connection, text.as_str()),
            Message::Binary(data) => match std::str::from_utf8(&data) {
                Ok(text) => handle_client_message(&connection, text),
                Err(_) => info!(len = data.len(), "ignoring non-UTF8 binary frame"),
            },
            Message::Close(_) => {
                info!("client sent close frame");
                break;
            }
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    // Teardown, at most once even if a racing path closed the connection.
    if connection.begin_close() {
        registry.unregister(&id).await;
        connection.finish_close();
    }
    info!("client disconnected");
    counter!("ws_disconnections_total").increment(1);
    gauge!("ws_connections_active").decrement(1.0);
    histogram!("ws_connection_duration_seconds").record(session_start.elapsed().as_secs_f64());

    outbound.abort();
    // The heartbeat token was cancelled by begin_close; join for determinism.
    let _ = heartbeat.await;
}

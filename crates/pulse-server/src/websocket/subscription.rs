//! Inbound message handling — interprets client frames and mutates the
//! connection's subscription set.

use metrics::counter;
use pulse_core::{ClientMessage, ServerEvent};
use tracing::{debug, warn};

use super::connection::ClientConnection;

/// Handle one inbound frame from a connection.
///
/// Malformed payloads are logged and discarded; the connection stays open.
/// A `subscribe` appends the channel (duplicates kept, no unsubscribe) and
/// acks with a `subscribed` event to this connection only. Every other
/// message type is a no-op, reserved for extension.
pub fn handle_client_message(connection: &ClientConnection, raw: &str) {
    counter!("ws_messages_received_total").increment(1);

    let message = match ClientMessage::parse(raw) {
        Ok(message) => message,
        Err(error) => {
            warn!(conn_id = %connection.id, %error, "discarding malformed client message");
            return;
        }
    };

    match message {
        ClientMessage::Subscribe { channel } => {
            connection.subscribe(channel.clone());
            debug!(conn_id = %connection.id, channel, "subscription added");
            if !connection.send_event(&ServerEvent::subscribed(channel)) {
                warn!(conn_id = %connection.id, "failed to enqueue subscription ack");
            }
        }
        ClientMessage::Unknown => {
            debug!(conn_id = %connection.id, "ignoring unrecognized client message");
        }
    }
}

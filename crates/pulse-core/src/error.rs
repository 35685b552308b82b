//! Protocol-level errors.

use thiserror::Error;

/// Errors arising from the client-to-server wire protocol.
///
/// These are always local to a single connection: a malformed payload is
/// logged and discarded, and the connection stays open.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The inbound payload could not be parsed as a client message.
    #[error("malformed client message: {0}")]
    Malformed(#[from] serde_json::Error),
}

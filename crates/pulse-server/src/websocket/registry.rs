//! Live connection registry — the synchronization boundary for the
//! connection set.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pulse_core::ConnectionId;
use thiserror::Error;
use tokio::sync::RwLock;

use super::connection::ClientConnection;

/// Invariant violations raised by the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A connection with this ID is already registered. IDs are generated
    /// per connection, so this indicates a bug in the caller, not a
    /// recoverable condition.
    #[error("connection {0} is already registered")]
    DuplicateId(ConnectionId),
}

/// Tracks all live connections.
///
/// Every mutation of the live set and every broadcast iteration goes
/// through here. [`snapshot`](ConnectionRegistry::snapshot) clones the
/// current `Arc`s under the read lock and releases it before the caller
/// iterates, so delivery never observes a torn set and never holds up
/// register/unregister beyond the clone itself.
pub struct ConnectionRegistry {
    /// Live connections indexed by connection ID.
    connections: RwLock<HashMap<ConnectionId, Arc<ClientConnection>>>,
    /// Atomic counter tracking the live count (avoids read-locking for
    /// health checks and admission control).
    active_count: AtomicUsize,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            active_count: AtomicUsize::new(0),
        }
    }

    /// Add a connection to the live set.
    pub async fn register(&self, connection: Arc<ClientConnection>) -> Result<(), RegistryError> {
        let mut connections = self.connections.write().await;
        if connections.contains_key(&connection.id) {
            return Err(RegistryError::DuplicateId(connection.id.clone()));
        }
        let _ = connections.insert(connection.id.clone(), connection);
        let _ = self.active_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Remove a connection by ID. Removing an unknown ID is a no-op.
    pub async fn unregister(&self, id: &ConnectionId) {
        let mut connections = self.connections.write().await;
        if connections.remove(id).is_some() {
            let _ = self.active_count.fetch_sub(1, Ordering::Relaxed);
        }
    }

    /// A consistent point-in-time view of the live set.
    pub async fn snapshot(&self) -> Vec<Arc<ClientConnection>> {
        let connections = self.connections.read().await;
        connections.values().cloned().collect()
    }

    /// Number of live connections (lock-free).
    pub fn count(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

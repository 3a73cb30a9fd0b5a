//! Result fan-out to connected clients.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::connection::ClientConnection;

/// Tracks every connected client and fans broadcast text out to all of
/// them.
pub struct ClientRegistry {
    /// Connected clients indexed by connection ID.
    connections: RwLock<HashMap<String, Arc<ClientConnection>>>,
}

impl ClientRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Add a connection. Re-adding an ID replaces the previous entry.
    pub async fn add(&self, connection: Arc<ClientConnection>) {
        let mut conns = self.connections.write().await;
        let _ = conns.insert(connection.id.clone(), connection);
    }

    /// Remove a connection by ID. Removing an unknown ID is a no-op.
    pub async fn remove(&self, connection_id: &str) {
        let mut conns = self.connections.write().await;
        let _ = conns.remove(connection_id);
    }

    /// Send `message` to every connected client.
    ///
    /// Clients whose channel is full or closed are dropped from the
    /// registry; their sessions clean up the socket side on their own.
    /// Returns the number of clients the message was enqueued for.
    pub async fn broadcast(&self, message: &str) -> usize {
        let text: Arc<str> = Arc::from(message);
        let mut failed = Vec::new();
        let mut delivered = 0;
        {
            let conns = self.connections.read().await;
            debug!(recipients = conns.len(), "broadcasting result");
            for conn in conns.values() {
                if conn.send(text.clone()) {
                    delivered += 1;
                } else {
                    warn!(conn_id = %conn.id, "failed to send to client, pruning");
                    failed.push(conn.id.clone());
                }
            }
        }
        if !failed.is_empty() {
            let mut conns = self.connections.write().await;
            for id in &failed {
                let _ = conns.remove(id);
            }
        }
        delivered
    }

    /// Number of active connections.
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Whether no clients are connected.
    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }

    /// All current connections.
    pub async fn snapshot(&self) -> Vec<Arc<ClientConnection>> {
        self.connections.read().await.values().cloned().collect()
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn make_connection(id: &str) -> (Arc<ClientConnection>, mpsc::Receiver<Arc<str>>) {
        let (tx, rx) = mpsc::channel(32);
        (Arc::new(ClientConnection::new(id.into(), tx)), rx)
    }

    #[tokio::test]
    async fn add_and_remove() {
        let registry = ClientRegistry::new();
        let (conn, _rx) = make_connection("c1");
        registry.add(conn).await;
        assert_eq!(registry.len().await, 1);
        registry.remove("c1").await;
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn remove_nonexistent_is_noop() {
        let registry = ClientRegistry::new();
        registry.remove("no_such").await;
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn add_same_id_replaces() {
        let registry = ClientRegistry::new();
        let (c1, mut rx1) = make_connection("same");
        let (c2, mut rx2) = make_connection("same");
        registry.add(c1).await;
        registry.add(c2).await;
        assert_eq!(registry.len().await, 1);

        let _ = registry.broadcast("hello").await;
        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().is_ok());
    }

    #[tokio::test]
    async fn broadcast_reaches_every_client() {
        let registry = ClientRegistry::new();
        let (c1, mut rx1) = make_connection("c1");
        let (c2, mut rx2) = make_connection("c2");
        registry.add(c1).await;
        registry.add(c2).await;

        let delivered = registry.broadcast("arm").await;
        assert_eq!(delivered, 2);
        assert_eq!(&*rx1.try_recv().unwrap(), "arm");
        assert_eq!(&*rx2.try_recv().unwrap(), "arm");
    }

    #[tokio::test]
    async fn broadcast_to_empty_registry() {
        let registry = ClientRegistry::new();
        assert_eq!(registry.broadcast("anything").await, 0);
    }

    #[tokio::test]
    async fn broadcast_prunes_closed_channels() {
        let registry = ClientRegistry::new();
        let (c1, rx1) = make_connection("dead");
        let (c2, mut rx2) = make_connection("live");
        registry.add(c1).await;
        registry.add(c2).await;
        drop(rx1);

        let delivered = registry.broadcast("arm").await;
        assert_eq!(delivered, 1);
        assert_eq!(registry.len().await, 1);
        assert_eq!(&*rx2.try_recv().unwrap(), "arm");

        // The pruned client is gone for subsequent broadcasts too
        assert_eq!(registry.broadcast("leg").await, 1);
    }

    #[tokio::test]
    async fn snapshot_lists_connections() {
        let registry = ClientRegistry::new();
        let (c1, _rx1) = make_connection("c1");
        let (c2, _rx2) = make_connection("c2");
        registry.add(c1).await;
        registry.add(c2).await;

        let mut ids: Vec<String> =
            registry.snapshot().await.iter().map(|c| c.id.clone()).collect();
        ids.sort();
        assert_eq!(ids, vec!["c1".to_string(), "c2".to_string()]);
    }

    #[tokio::test]
    async fn default_registry_is_empty() {
        let registry = ClientRegistry::default();
        assert!(registry.is_empty().await);
    }
}

//! Live connection registry
//!
//! Tracks every live WebSocket connection per user and fans a payload out
//! to all of them. Multiple connections per user (tabs, devices) are
//! expected. Entries are purely in-memory: they vanish on disconnect, on
//! failed delivery or on process restart; the persisted record is the
//! durable source of truth for offline users.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use notification_storage::queue::NotificationKind;
use serde::Serialize;
use tokio::sync::{mpsc, RwLock};

/// Outgoing channel capacity per connection
const CONNECTION_BUFFER: usize = 32;

/// Payload pushed to live connections
///
/// Carries the structured `data` value, unlike the persisted record which
/// stores its serialized form.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PushPayload {
    /// Notification id, same as the persisted record
    pub id: String,
    /// Notification category
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Display title
    pub title: String,
    /// Display message
    pub message: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Original structured payload
    pub data: serde_json::Value,
}

/// Process-unique identity of one live connection
///
/// Handles are compared by this id only, never by anything external.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionId(u64);

struct ConnectionHandle {
    id: ConnectionId,
    sender: mpsc::Sender<PushPayload>,
}

/// Registry of live connections, keyed by user id
pub struct ConnectionRegistry {
    /// user id -> live connection handles
    connections: RwLock<HashMap<String, Vec<ConnectionHandle>>>,
    next_id: AtomicU64,
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionRegistry {
    /// Creates an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Registers a new live connection for a user
    ///
    /// Returns the connection's identity and the receiver whose payloads
    /// the caller must forward to the socket. Existing connections of the
    /// same user are retained.
    pub async fn connect(&self, user_id: &str) -> (ConnectionId, mpsc::Receiver<PushPayload>) {
        let (tx, rx) = mpsc::channel(CONNECTION_BUFFER);
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));

        let mut connections = self.connections.write().await;
        connections
            .entry(user_id.to_string())
            .or_default()
            .push(ConnectionHandle { id, sender: tx });

        (id, rx)
    }

    /// Removes one connection; the user entry itself goes away with its
    /// last handle so no empty entries linger
    pub async fn disconnect(&self, user_id: &str, connection_id: ConnectionId) {
        let mut connections = self.connections.write().await;
        if let Some(handles) = connections.get_mut(user_id) {
            handles.retain(|handle| handle.id != connection_id);
            if handles.is_empty() {
                connections.remove(user_id);
            }
        }
    }

    /// Delivers a payload to every live connection of a user
    ///
    /// A user without an entry is a no-op. Delivery is two-phase: the
    /// handle set is snapshotted under the read lock, payloads are handed
    /// to each connection's buffer outside it, and handles that failed are
    /// evicted afterwards. Delivery never waits on a peer: a full buffer
    /// means the peer stopped draining and counts as dead, the same as a
    /// closed channel. One handle's failure never blocks another, and the
    /// live set is never mutated mid-iteration.
    ///
    /// Returns the number of successful deliveries.
    pub async fn send_to_user(&self, user_id: &str, payload: &PushPayload) -> usize {
        let targets: Vec<(ConnectionId, mpsc::Sender<PushPayload>)> = {
            let connections = self.connections.read().await;
            match connections.get(user_id) {
                None => return 0,
                Some(handles) => handles
                    .iter()
                    .map(|handle| (handle.id, handle.sender.clone()))
                    .collect(),
            }
        };

        let mut delivered = 0;
        let mut dead = Vec::new();
        for (id, sender) in targets {
            match sender.try_send(payload.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_) | mpsc::error::TrySendError::Closed(_)) => {
                    dead.push(id);
                }
            }
        }

        if !dead.is_empty() {
            tracing::debug!(
                user_id,
                dead = dead.len(),
                "evicting dead connections after delivery pass"
            );
            let mut connections = self.connections.write().await;
            if let Some(handles) = connections.get_mut(user_id) {
                handles.retain(|handle| !dead.contains(&handle.id));
                if handles.is_empty() {
                    connections.remove(user_id);
                }
            }
        }

        delivered
    }

    /// Delivers a payload to every currently-registered user
    ///
    /// The user-key set is snapshotted first, so connects and disconnects
    /// that happen during the broadcast do not change which users this
    /// call targets.
    pub async fn broadcast(&self, payload: &PushPayload) -> usize {
        let users: Vec<String> = {
            let connections = self.connections.read().await;
            connections.keys().cloned().collect()
        };

        let mut delivered = 0;
        for user_id in users {
            delivered += self.send_to_user(&user_id, payload).await;
        }
        delivered
    }

    /// Number of live connections for a user
    pub async fn connection_count(&self, user_id: &str) -> usize {
        let connections = self.connections.read().await;
        connections.get(user_id).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_payload() -> PushPayload {
        PushPayload {
            id: "n1".to_string(),
            kind: NotificationKind::WordSaved,
            title: NotificationKind::WordSaved.title().to_string(),
            message: NotificationKind::WordSaved.body().to_string(),
            created_at: Utc::now(),
            data: serde_json::json!({"word": "hola"}),
        }
    }

    #[tokio::test]
    async fn fan_out_reaches_every_connection_of_the_user() {
        let registry = ConnectionRegistry::new();
        let (_id_a, mut rx_a) = registry.connect("u1").await;
        let (_id_b, mut rx_b) = registry.connect("u1").await;

        let payload = test_payload();
        let delivered = registry.send_to_user("u1", &payload).await;

        assert_eq!(delivered, 2);
        assert_eq!(rx_a.recv().await.unwrap(), payload);
        assert_eq!(rx_b.recv().await.unwrap(), payload);
    }

    #[tokio::test]
    async fn send_to_unknown_user_is_a_noop() {
        let registry = ConnectionRegistry::new();
        let delivered = registry.send_to_user("nobody", &test_payload()).await;
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn dead_connection_is_evicted_and_never_targeted_again() {
        let registry = ConnectionRegistry::new();
        let (_id_a, mut rx_a) = registry.connect("u1").await;
        let (_id_b, rx_b) = registry.connect("u1").await;

        // The peer behind the second connection goes away
        drop(rx_b);

        let delivered = registry.send_to_user("u1", &test_payload()).await;
        assert_eq!(delivered, 1, "only the surviving connection is reached");
        assert!(rx_a.recv().await.is_some());
        assert_eq!(registry.connection_count("u1").await, 1);

        // The evicted handle is not targeted by subsequent sends
        let delivered = registry.send_to_user("u1", &test_payload()).await;
        assert_eq!(delivered, 1);
    }

    #[tokio::test]
    async fn stalled_connection_is_evicted_without_blocking_fan_out() {
        let registry = ConnectionRegistry::new();
        let (_id_a, mut rx_a) = registry.connect("u1").await;
        // The peer behind the second connection stops draining its socket
        let (_id_b, _rx_b) = registry.connect("u1").await;

        // Fill the stalled connection's buffer to capacity
        for _ in 0..CONNECTION_BUFFER {
            registry.send_to_user("u1", &test_payload()).await;
            rx_a.recv().await.unwrap();
        }

        let delivered = tokio::time::timeout(
            std::time::Duration::from_secs(2),
            registry.send_to_user("u1", &test_payload()),
        )
        .await
        .expect("fan-out must not wait on a stalled connection");

        assert_eq!(delivered, 1, "only the draining connection is reached");
        assert!(rx_a.recv().await.is_some());
        assert_eq!(registry.connection_count("u1").await, 1);
    }

    #[tokio::test]
    async fn disconnecting_the_last_handle_removes_the_user_entry() {
        let registry = ConnectionRegistry::new();
        let (id, _rx) = registry.connect("u1").await;

        registry.disconnect("u1", id).await;

        assert_eq!(registry.connection_count("u1").await, 0);
        // A later send is a no-op on a missing entry, not an error
        assert_eq!(registry.send_to_user("u1", &test_payload()).await, 0);
    }

    #[tokio::test]
    async fn disconnect_keeps_other_handles_of_the_same_user() {
        let registry = ConnectionRegistry::new();
        let (id_a, _rx_a) = registry.connect("u1").await;
        let (_id_b, mut rx_b) = registry.connect("u1").await;

        registry.disconnect("u1", id_a).await;

        assert_eq!(registry.connection_count("u1").await, 1);
        assert_eq!(registry.send_to_user("u1", &test_payload()).await, 1);
        assert!(rx_b.recv().await.is_some());
    }

    #[tokio::test]
    async fn broadcast_targets_every_registered_user() {
        let registry = ConnectionRegistry::new();
        let (_ida, mut rx_a) = registry.connect("u1").await;
        let (_idb, mut rx_b) = registry.connect("u2").await;

        let delivered = registry.broadcast(&test_payload()).await;

        assert_eq!(delivered, 2);
        assert!(rx_a.recv().await.is_some());
        assert!(rx_b.recv().await.is_some());
    }
}

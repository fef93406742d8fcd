//! Turns one inbound message into a persisted record and a live push
//!
//! Persist-then-push order is fixed: a push failure never rolls back
//! persistence, and a persistence failure suppresses the push entirely.

use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use notification_storage::notification::{
    Notification, NotificationStorage, NotificationStorageError,
};
use notification_storage::queue::InboundMessage;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::registry::{ConnectionRegistry, PushPayload};

pub struct NotificationProcessor {
    storage: Arc<NotificationStorage>,
    registry: Arc<ConnectionRegistry>,
}

impl NotificationProcessor {
    #[must_use]
    pub const fn new(storage: Arc<NotificationStorage>, registry: Arc<ConnectionRegistry>) -> Self {
        Self { storage, registry }
    }

    /// Processes one inbound message: persist, then fan out
    ///
    /// Messages without an addressee are dropped silently; there is no
    /// one to notify and nothing to retry. Push failures (user offline,
    /// dead connections) are best-effort and never surface here.
    ///
    /// # Errors
    ///
    /// Returns `NotificationStorageError` when persistence fails; the
    /// caller must treat the message as unprocessed and leave it
    /// unacknowledged.
    pub async fn process(&self, msg: InboundMessage) -> Result<(), NotificationStorageError> {
        let Some(user_id) = msg.user_id.as_deref().filter(|user| !user.is_empty()) else {
            debug!("inbound message has no addressee, dropping");
            counter!("notification_dropped_no_user").increment(1);
            return Ok(());
        };

        let kind = msg.kind;
        let data = msg
            .data
            .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));

        let notification_id = Uuid::new_v4().to_string();
        let created_at = Utc::now();

        let record = Notification {
            user_id: user_id.to_string(),
            notification_id: notification_id.clone(),
            kind: kind.clone(),
            title: kind.title().to_string(),
            message: kind.body().to_string(),
            read: false,
            created_at,
            // Persisted form is the serialized payload; the push below
            // carries the structured original
            data: serde_json::to_string(&data)
                .map_err(|e| NotificationStorageError::SerializationError(e.to_string()))?,
        };

        match self.storage.insert(&record).await {
            Ok(()) => {}
            // Freshly generated id already taken: the record is already
            // durable, do not fail the message
            Err(NotificationStorageError::NotificationExists) => {
                warn!(user_id, notification_id, "notification already persisted");
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        let payload = PushPayload {
            id: notification_id,
            title: kind.title().to_string(),
            message: kind.body().to_string(),
            kind,
            created_at,
            data,
        };

        let delivered = self.registry.send_to_user(user_id, &payload).await;
        if delivered == 0 {
            debug!(user_id, "no live connections, persisted record only");
        }

        counter!("notification_processed").increment(1);
        Ok(())
    }
}

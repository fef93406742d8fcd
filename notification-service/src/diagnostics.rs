//! Operational state of the queue consumer
//!
//! A last-writer-wins snapshot written only by the consumer loop and read
//! by the status route. Fields are independent scalars; a reader may see a
//! `last_error` from a slightly different instant than `last_message_at`,
//! which is acceptable for a best-effort health view.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Point-in-time view of the consumer's state
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsSnapshot {
    /// Queue the consumer reads from, if configured
    pub queue: Option<String>,
    /// When the consumer first connected successfully, if ever
    pub started_at: Option<DateTime<Utc>>,
    /// When the last message was processed successfully, if any
    pub last_message_at: Option<DateTime<Utc>>,
    /// The most recent error seen, if any
    pub last_error: Option<String>,
    /// Whether transport credentials/queue configuration were resolved
    pub has_transport_credentials: bool,
}

/// Mutable consumer state, injected into the consumer and the status route
///
/// Only the consumer writes; everything else takes read-only snapshots.
pub struct ConsumerDiagnostics {
    queue_url: Option<String>,
    started_at: RwLock<Option<DateTime<Utc>>>,
    last_message_at: RwLock<Option<DateTime<Utc>>>,
    last_error: RwLock<Option<String>>,
}

impl ConsumerDiagnostics {
    /// Creates diagnostics state for a consumer reading from `queue_url`
    ///
    /// `None` means the queue was never configured and the consumer is not
    /// running.
    #[must_use]
    pub const fn new(queue_url: Option<String>) -> Self {
        Self {
            queue_url,
            started_at: RwLock::new(None),
            last_message_at: RwLock::new(None),
            last_error: RwLock::new(None),
        }
    }

    /// Records the first successful connect; later calls are no-ops so
    /// `started_at` keeps the first value for the process lifetime
    pub fn mark_started(&self) {
        let mut started_at = self.started_at.write().expect("diagnostics lock poisoned");
        if started_at.is_none() {
            *started_at = Some(Utc::now());
        }
    }

    /// Records a successfully processed message
    pub fn record_message(&self) {
        *self
            .last_message_at
            .write()
            .expect("diagnostics lock poisoned") = Some(Utc::now());
    }

    /// Records the most recent error, overwriting any previous one
    pub fn record_error(&self, error: impl std::fmt::Display) {
        *self.last_error.write().expect("diagnostics lock poisoned") = Some(error.to_string());
    }

    /// Returns a point-in-time snapshot; always succeeds, with `None` for
    /// fields not yet populated
    #[must_use]
    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            queue: self.queue_url.clone(),
            started_at: *self.started_at.read().expect("diagnostics lock poisoned"),
            last_message_at: *self
                .last_message_at
                .read()
                .expect("diagnostics lock poisoned"),
            last_error: self
                .last_error
                .read()
                .expect("diagnostics lock poisoned")
                .clone(),
            has_transport_credentials: self.queue_url.is_some(),
        }
    }
}

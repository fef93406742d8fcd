//! Long-running queue consumer
//!
//! Drives every received message through the processor and acknowledges
//! only on success; unacked messages follow the transport's own
//! redelivery/dead-letter policy. The receive loop is an explicit state
//! machine so backoff and diagnostics updates hang off named transitions
//! instead of nested error handlers:
//!
//! ```text
//! Disconnected --(backoff elapsed)--> Connecting
//! Connecting   --(ping ok)---------> Listening
//! Connecting   --(ping failed)-----> Disconnected
//! Listening    --(batch received)--> Draining
//! Listening    --(transport error)-> Disconnected
//! Draining     --(batch handled)---> Listening
//! ```

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use notification_storage::queue::{InboundMessage, NotificationQueue, QueueMessage};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::diagnostics::ConsumerDiagnostics;
use crate::notification_processor::NotificationProcessor;

/// Backoff after the first failed connect
const INITIAL_BACKOFF: Duration = Duration::from_secs(5);
/// Backoff ceiling for repeated failures
const MAX_BACKOFF: Duration = Duration::from_secs(30);
/// Sleep between polls when the queue is empty
const IDLE_SLEEP: Duration = Duration::from_millis(500);

enum ConsumerState {
    /// Waiting out a backoff delay before reconnecting
    Disconnected { delay: Duration },
    /// Probing the transport before entering the receive loop
    Connecting,
    /// Receiving batches
    Listening,
    /// Working through one received batch, message by message
    Draining(Vec<QueueMessage>),
}

pub struct NotificationConsumer {
    queue: Arc<NotificationQueue>,
    processor: Arc<NotificationProcessor>,
    diagnostics: Arc<ConsumerDiagnostics>,
    shutdown: CancellationToken,
}

impl NotificationConsumer {
    #[must_use]
    pub const fn new(
        queue: Arc<NotificationQueue>,
        processor: Arc<NotificationProcessor>,
        diagnostics: Arc<ConsumerDiagnostics>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            queue,
            processor,
            diagnostics,
            shutdown,
        }
    }

    /// Runs the consumer until shutdown
    ///
    /// There is no terminal failure state while the process lives: every
    /// runtime failure loops back through `Disconnected` with bounded
    /// exponential backoff.
    pub async fn start(self) {
        info!(queue = self.queue.queue_url(), "Starting NotificationConsumer");

        let mut backoff = INITIAL_BACKOFF;
        let mut state = ConsumerState::Connecting;

        while !self.shutdown.is_cancelled() {
            state = match state {
                ConsumerState::Disconnected { delay } => {
                    tokio::select! {
                        () = tokio::time::sleep(delay) => ConsumerState::Connecting,
                        () = self.shutdown.cancelled() => break,
                    }
                }
                ConsumerState::Connecting => match self.queue.ping().await {
                    Ok(()) => {
                        self.diagnostics.mark_started();
                        backoff = INITIAL_BACKOFF;
                        info!(queue = self.queue.queue_url(), "Listening for messages");
                        ConsumerState::Listening
                    }
                    Err(e) => {
                        self.diagnostics.record_error(&e);
                        error!(error = %e, "Failed to connect to queue, retrying in {backoff:?}");
                        let delay = backoff;
                        backoff = (backoff * 2).min(MAX_BACKOFF);
                        ConsumerState::Disconnected { delay }
                    }
                },
                ConsumerState::Listening => {
                    tokio::select! {
                        result = self.queue.poll_messages() => match result {
                            Ok(batch) if batch.is_empty() => {
                                tokio::time::sleep(IDLE_SLEEP).await;
                                ConsumerState::Listening
                            }
                            Ok(batch) => ConsumerState::Draining(batch),
                            Err(e) => {
                                self.diagnostics.record_error(&e);
                                error!(error = %e, "Transport failure, reconnecting in {backoff:?}");
                                let delay = backoff;
                                backoff = (backoff * 2).min(MAX_BACKOFF);
                                ConsumerState::Disconnected { delay }
                            }
                        },
                        () = self.shutdown.cancelled() => break,
                    }
                }
                ConsumerState::Draining(batch) => {
                    // In receipt order; one message's failure never aborts
                    // the rest of the batch
                    for message in batch {
                        self.handle_message(message).await;
                    }
                    ConsumerState::Listening
                }
            };
        }

        info!("NotificationConsumer shutdown complete");
    }

    /// Processes one message and acknowledges it on success
    ///
    /// Failures are recorded in diagnostics and leave the message
    /// unacknowledged, so the transport redelivers or dead-letters it.
    async fn handle_message(&self, message: QueueMessage) {
        let inbound = match serde_json::from_str::<InboundMessage>(&message.body) {
            Ok(inbound) => inbound,
            Err(e) => {
                self.diagnostics
                    .record_error(format!("failed to decode message {}: {e}", message.message_id));
                warn!(
                    message_id = message.message_id,
                    error = %e,
                    "Undecodable message left unacknowledged"
                );
                counter!("notification_decode_failed").increment(1);
                return;
            }
        };

        if let Err(e) = self.processor.process(inbound).await {
            self.diagnostics.record_error(&e);
            error!(
                message_id = message.message_id,
                error = %e,
                "Failed to process message, leaving unacknowledged"
            );
            counter!("notification_process_failed").increment(1);
            return;
        }

        if let Err(e) = self.queue.ack_message(&message.receipt_handle).await {
            // Processed but not acked: the transport redelivers, which
            // at-least-once delivery allows
            self.diagnostics.record_error(&e);
            error!(message_id = message.message_id, error = %e, "Failed to acknowledge message");
            return;
        }

        self.diagnostics.record_message();
        counter!("notification_delivered").increment(1);
    }
}

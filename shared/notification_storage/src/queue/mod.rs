//! Inbound notification queue operations
//!
//! This module provides the SQS side of the delivery pipeline: producers
//! enqueue [`InboundMessage`]s, the consumer polls raw bodies and
//! acknowledges each message only after successful processing. Unacked
//! messages follow the queue's own redelivery/dead-letter policy.

/// Error types for queue operations
pub mod error;
/// Common types for queue operations
pub mod types;

pub use error::{QueueError, QueueResult};
pub use types::{InboundMessage, NotificationKind, QueueConfig, QueueMessage};

use aws_sdk_sqs::types::QueueAttributeName;
use aws_sdk_sqs::Client as SqsClient;
use std::sync::Arc;

/// Queue client for inbound notification messages
pub struct NotificationQueue {
    sqs_client: Arc<SqsClient>,
    config: QueueConfig,
}

impl NotificationQueue {
    /// Creates a new notification queue
    ///
    /// # Arguments
    ///
    /// * `sqs_client` - Pre-configured SQS client
    /// * `config` - Queue configuration including URL and default parameters
    #[must_use]
    pub const fn new(sqs_client: Arc<SqsClient>, config: QueueConfig) -> Self {
        Self { sqs_client, config }
    }

    /// Returns the configured queue URL
    #[must_use]
    pub fn queue_url(&self) -> &str {
        &self.config.queue_url
    }

    /// Sends an inbound message to the queue
    ///
    /// # Returns
    ///
    /// The message ID if successful or an empty string
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if serialization or the send operation fails
    pub async fn send_message(&self, message: &InboundMessage) -> QueueResult<String> {
        let body = serde_json::to_string(message)?;

        let result = self
            .sqs_client
            .send_message()
            .queue_url(&self.config.queue_url)
            .message_body(body)
            .send()
            .await?;

        Ok(result
            .message_id()
            .map(std::string::ToString::to_string)
            .unwrap_or_default())
    }

    /// Polls a batch of raw messages from the queue
    ///
    /// Bodies are returned undecoded; the caller owns decoding so that a
    /// malformed body can be recorded and left unacknowledged.
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if the receive operation fails
    pub async fn poll_messages(&self) -> QueueResult<Vec<QueueMessage>> {
        let result = self
            .sqs_client
            .receive_message()
            .queue_url(&self.config.queue_url)
            .max_number_of_messages(self.config.default_max_messages)
            .visibility_timeout(self.config.default_visibility_timeout)
            .wait_time_seconds(self.config.default_wait_time_seconds)
            .send()
            .await?;

        let messages: Vec<QueueMessage> = result
            .messages()
            .iter()
            .filter_map(|msg| {
                let body = msg.body()?.to_string();
                let receipt_handle = msg.receipt_handle()?.to_string();
                let message_id = msg.message_id()?.to_string();

                Some(QueueMessage {
                    body,
                    receipt_handle,
                    message_id,
                })
            })
            .collect();

        if !messages.is_empty() {
            tracing::debug!("Received batch of {} messages", messages.len());
        }

        Ok(messages)
    }

    /// Acknowledges receipt of a message by deleting it from the queue
    ///
    /// # Arguments
    ///
    /// * `receipt_handle` - The receipt handle from the received message
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if the acknowledgment fails
    pub async fn ack_message(&self, receipt_handle: &str) -> QueueResult<()> {
        self.sqs_client
            .delete_message()
            .queue_url(&self.config.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await?;

        Ok(())
    }

    /// Probes the queue to verify the transport session is usable
    ///
    /// Used by the consumer as its connect step before entering the
    /// receive loop.
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if the queue cannot be reached
    pub async fn ping(&self) -> QueueResult<()> {
        self.sqs_client
            .get_queue_attributes()
            .queue_url(&self.config.queue_url)
            .attribute_names(QueueAttributeName::QueueArn)
            .send()
            .await?;

        Ok(())
    }
}

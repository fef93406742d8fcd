//! Notification record storage integration using DynamoDB
//!
//! Each record is owned by exactly one user: the user id is the partition
//! key and the notification id the sort key. Records are inserted by the
//! processor, flipped to read by the REST layer and never mutated otherwise.

mod error;

use std::sync::Arc;

use aws_sdk_dynamodb::{
    error::SdkError,
    types::{AttributeValue, Select},
    Client as DynamoDbClient,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

pub use error::{NotificationStorageError, NotificationStorageResult};

use crate::queue::NotificationKind;

/// Attribute names for the notification table
#[derive(Debug, Clone, Display)]
#[strum(serialize_all = "snake_case")]
pub enum NotificationAttribute {
    /// Owning user id (Partition Key)
    UserId,
    /// Notification id, unique within the owner (Sort Key)
    NotificationId,
    /// Read flag
    Read,
}

/// Persisted notification record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Owning user id (Partition Key)
    pub user_id: String,
    /// Notification id, unique within the owner (Sort Key)
    pub notification_id: String,
    /// Notification category, stored as its wire string
    pub kind: NotificationKind,
    /// Display title derived from the kind
    pub title: String,
    /// Display message derived from the kind
    pub message: String,
    /// Read flag; starts false and only ever transitions to true
    pub read: bool,
    /// Creation timestamp, set at processing time
    pub created_at: DateTime<Utc>,
    /// JSON-serialized form of the inbound payload
    pub data: String,
}

/// Notification storage client for DynamoDB operations
pub struct NotificationStorage {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
}

impl NotificationStorage {
    /// Creates a new notification storage client
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured DynamoDB client
    /// * `table_name` - DynamoDB table name for notifications
    #[must_use]
    pub const fn new(dynamodb_client: Arc<DynamoDbClient>, table_name: String) -> Self {
        Self {
            dynamodb_client,
            table_name,
        }
    }

    /// Inserts a new notification record
    ///
    /// # Errors
    ///
    /// Returns [`NotificationStorageError::NotificationExists`] if a record
    /// with the same owner and id is already stored, or another
    /// `NotificationStorageError` if the DynamoDB operation fails
    pub async fn insert(&self, notification: &Notification) -> NotificationStorageResult<()> {
        let item = serde_dynamo::to_item(notification)
            .map_err(|e| NotificationStorageError::SerializationError(e.to_string()))?;

        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(#sk)")
            .expression_attribute_names("#sk", NotificationAttribute::NotificationId.to_string())
            .send()
            .await
            .map_err(|err| {
                if matches!(
                    err,
                    SdkError::ServiceError(ref svc) if svc.err().is_conditional_check_failed_exception()
                ) {
                    NotificationStorageError::NotificationExists
                } else {
                    err.into()
                }
            })?;

        Ok(())
    }

    /// Reads a single notification record
    ///
    /// # Returns
    ///
    /// `Ok(None)` if no record exists for this owner and id
    ///
    /// # Errors
    ///
    /// Returns `NotificationStorageError` if the DynamoDB operation fails
    pub async fn get(
        &self,
        user_id: &str,
        notification_id: &str,
    ) -> NotificationStorageResult<Option<Notification>> {
        let response = self
            .dynamodb_client
            .get_item()
            .table_name(&self.table_name)
            .key(
                NotificationAttribute::UserId.to_string(),
                AttributeValue::S(user_id.to_string()),
            )
            .key(
                NotificationAttribute::NotificationId.to_string(),
                AttributeValue::S(notification_id.to_string()),
            )
            .send()
            .await?;

        response
            .item()
            .map(|item| {
                serde_dynamo::from_item(item.clone())
                    .map_err(|e| NotificationStorageError::ParseNotificationError(e.to_string()))
            })
            .transpose()
    }

    /// Marks a notification as read
    ///
    /// The transition is false→true only and idempotent: marking an
    /// already-read notification leaves it read.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationStorageError::NotificationNotFound`] if no
    /// record exists for this owner and id, or another
    /// `NotificationStorageError` if the DynamoDB operation fails
    pub async fn mark_read(
        &self,
        user_id: &str,
        notification_id: &str,
    ) -> NotificationStorageResult<()> {
        self.dynamodb_client
            .update_item()
            .table_name(&self.table_name)
            .key(
                NotificationAttribute::UserId.to_string(),
                AttributeValue::S(user_id.to_string()),
            )
            .key(
                NotificationAttribute::NotificationId.to_string(),
                AttributeValue::S(notification_id.to_string()),
            )
            .update_expression("SET #read = :read")
            .condition_expression("attribute_exists(#sk)")
            .expression_attribute_names("#read", NotificationAttribute::Read.to_string())
            .expression_attribute_names("#sk", NotificationAttribute::NotificationId.to_string())
            .expression_attribute_values(":read", AttributeValue::Bool(true))
            .send()
            .await
            .map_err(|err| {
                if matches!(
                    err,
                    SdkError::ServiceError(ref svc) if svc.err().is_conditional_check_failed_exception()
                ) {
                    NotificationStorageError::NotificationNotFound
                } else {
                    err.into()
                }
            })?;

        Ok(())
    }

    /// Queries all notifications owned by a user
    ///
    /// # Arguments
    ///
    /// * `user_id` - The owning user id
    /// * `limit` - Maximum number of records to return
    ///
    /// # Errors
    ///
    /// Returns `NotificationStorageError` if the DynamoDB operation fails
    pub async fn query_by_user(
        &self,
        user_id: &str,
        limit: i32,
    ) -> NotificationStorageResult<Vec<Notification>> {
        let response = self
            .dynamodb_client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression("#pk = :user_id")
            .expression_attribute_names("#pk", NotificationAttribute::UserId.to_string())
            .expression_attribute_values(":user_id", AttributeValue::S(user_id.to_string()))
            .select(Select::AllAttributes)
            .limit(limit)
            .send()
            .await?;

        let items = response.items();
        items
            .iter()
            .map(|item| {
                serde_dynamo::from_item(item.clone())
                    .map_err(|e| NotificationStorageError::ParseNotificationError(e.to_string()))
            })
            .collect()
    }

    /// Deletes a notification record
    ///
    /// Deletion is an external operation; the delivery pipeline itself
    /// never removes records.
    ///
    /// # Errors
    ///
    /// Returns `NotificationStorageError` if the DynamoDB operation fails
    pub async fn delete(
        &self,
        user_id: &str,
        notification_id: &str,
    ) -> NotificationStorageResult<()> {
        self.dynamodb_client
            .delete_item()
            .table_name(&self.table_name)
            .key(
                NotificationAttribute::UserId.to_string(),
                AttributeValue::S(user_id.to_string()),
            )
            .key(
                NotificationAttribute::NotificationId.to_string(),
                AttributeValue::S(notification_id.to_string()),
            )
            .send()
            .await?;

        Ok(())
    }
}

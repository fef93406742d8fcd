use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use thiserror::Error;

/// Result type alias for notification storage operations
pub type NotificationStorageResult<T> = Result<T, NotificationStorageError>;

/// Error types for notification storage operations
#[derive(Error, Debug)]
pub enum NotificationStorageError {
    /// Error writing a notification to DynamoDB
    #[error("Failed to put notification: {0}")]
    DynamoDbPutError(#[from] SdkError<PutItemError>),

    /// Error reading a notification from DynamoDB
    #[error("Failed to get notification: {0}")]
    DynamoDbGetError(#[from] SdkError<GetItemError>),

    /// Error updating a notification in DynamoDB
    #[error("Failed to update notification: {0}")]
    DynamoDbUpdateError(#[from] SdkError<UpdateItemError>),

    /// Error querying notifications from DynamoDB
    #[error("Failed to query notifications: {0}")]
    DynamoDbQueryError(#[from] SdkError<QueryError>),

    /// Error deleting a notification from DynamoDB
    #[error("Failed to delete notification: {0}")]
    DynamoDbDeleteError(#[from] SdkError<DeleteItemError>),

    /// Error serializing a notification for storage
    #[error("Failed to serialize notification: {0}")]
    SerializationError(String),

    /// Error parsing a stored notification
    #[error("Failed to parse notification: {0}")]
    ParseNotificationError(String),

    /// A notification with this id already exists for the user
    #[error("Notification already exists")]
    NotificationExists,

    /// No notification with this id exists for the user
    #[error("Notification not found")]
    NotificationNotFound,
}

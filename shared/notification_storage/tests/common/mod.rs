//! Shared test setup utilities for LocalStack

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, KeySchemaElement, KeyType, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_sqs::Client as SqsClient;
use notification_storage::notification::{Notification, NotificationAttribute};
use notification_storage::queue::NotificationKind;
use uuid::Uuid;

const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";
const TEST_REGION: &str = "us-east-1";

/// LocalStack AWS config with hardcoded credentials for CI
pub async fn localstack_config() -> aws_config::SdkConfig {
    let credentials = Credentials::from_keys(
        "test", // AWS_ACCESS_KEY_ID
        "test", // AWS_SECRET_ACCESS_KEY
        None,   // no session token
    );

    aws_config::defaults(BehaviorVersion::latest())
        .endpoint_url(LOCALSTACK_ENDPOINT)
        .region(aws_config::Region::new(TEST_REGION))
        .credentials_provider(credentials)
        .load()
        .await
}

/// Test context that provides a unique notification table
pub struct TableTestContext {
    pub dynamodb_client: Arc<DynamoDbClient>,
    pub table_name: String,
}

impl TableTestContext {
    /// Creates a new test context with a unique table
    pub async fn new() -> Self {
        let table_name = format!("test-notifications-{}", Uuid::new_v4());
        let config = localstack_config().await;
        let dynamodb_client = Arc::new(DynamoDbClient::new(&config));

        dynamodb_client
            .create_table()
            .table_name(&table_name)
            .attribute_definitions(
                AttributeDefinition::builder()
                    .attribute_name(NotificationAttribute::UserId.to_string())
                    .attribute_type(ScalarAttributeType::S)
                    .build()
                    .unwrap(),
            )
            .attribute_definitions(
                AttributeDefinition::builder()
                    .attribute_name(NotificationAttribute::NotificationId.to_string())
                    .attribute_type(ScalarAttributeType::S)
                    .build()
                    .unwrap(),
            )
            .key_schema(
                KeySchemaElement::builder()
                    .attribute_name(NotificationAttribute::UserId.to_string())
                    .key_type(KeyType::Hash)
                    .build()
                    .unwrap(),
            )
            .key_schema(
                KeySchemaElement::builder()
                    .attribute_name(NotificationAttribute::NotificationId.to_string())
                    .key_type(KeyType::Range)
                    .build()
                    .unwrap(),
            )
            .billing_mode(aws_sdk_dynamodb::types::BillingMode::PayPerRequest)
            .send()
            .await
            .expect("Failed to create test table");

        // Give LocalStack a moment before first use
        tokio::time::sleep(Duration::from_millis(100)).await;

        Self {
            dynamodb_client,
            table_name,
        }
    }
}

impl Drop for TableTestContext {
    fn drop(&mut self) {
        let client = self.dynamodb_client.clone();
        let table = self.table_name.clone();

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let _ = client.delete_table().table_name(&table).send().await;
            });
        }
    }
}

/// Test context that provides a unique queue
pub struct QueueTestContext {
    pub sqs_client: Arc<SqsClient>,
    pub queue_url: String,
}

impl QueueTestContext {
    /// Creates a new test context with a unique queue
    pub async fn new(test_name: &str) -> Self {
        let queue_name = format!("{}-{}", test_name, Uuid::new_v4());
        let config = localstack_config().await;
        let sqs_client = Arc::new(SqsClient::new(&config));

        let result = sqs_client
            .create_queue()
            .queue_name(&queue_name)
            .send()
            .await
            .expect("Failed to create test queue");

        let queue_url = result
            .queue_url()
            .expect("Queue URL not returned")
            .to_string();

        Self {
            sqs_client,
            queue_url,
        }
    }
}

impl Drop for QueueTestContext {
    fn drop(&mut self) {
        let client = self.sqs_client.clone();
        let queue_url = self.queue_url.clone();

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let _ = client.delete_queue().queue_url(&queue_url).send().await;
            });
        }
    }
}

/// Creates a notification record for a user with a unique id
pub fn create_test_notification(user_id: &str, kind: NotificationKind) -> Notification {
    Notification {
        user_id: user_id.to_string(),
        notification_id: Uuid::new_v4().to_string(),
        title: kind.title().to_string(),
        message: kind.body().to_string(),
        kind,
        read: false,
        created_at: chrono::Utc::now(),
        data: r#"{"word":"hola"}"#.to_string(),
    }
}

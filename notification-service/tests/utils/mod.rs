//! LocalStack setup helpers for pipeline tests

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
use notification_storage::notification::{NotificationAttribute, NotificationStorage};
use notification_storage::queue::{NotificationQueue, QueueConfig};
use uuid::Uuid;

const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";

pub async fn localstack_config() -> aws_config::SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .endpoint_url(LOCALSTACK_ENDPOINT)
        .region(aws_config::Region::new("us-east-1"))
        .credentials_provider(Credentials::from_keys("test", "test", None))
        .load()
        .await
}

/// One LocalStack table plus one queue, torn down on drop
pub struct PipelineTestContext {
    pub dynamodb_client: Arc<DynamoDbClient>,
    pub sqs_client: Arc<SqsClient>,
    pub table_name: String,
    pub queue_url: String,
}

impl PipelineTestContext {
    pub async fn new(test_name: &str) -> Self {
        let config = localstack_config().await;
        let dynamodb_client = Arc::new(DynamoDbClient::new(&config));
        let sqs_client = Arc::new(SqsClient::new(&config));

        let table_name = format!("test-pipeline-{}", Uuid::new_v4());
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

        let queue_name = format!("{}-{}", test_name, Uuid::new_v4());
        let queue_url = sqs_client
            .create_queue()
            .queue_name(&queue_name)
            .send()
            .await
            .expect("Failed to create test queue")
            .queue_url()
            .expect("Queue URL not returned")
            .to_string();

        tokio::time::sleep(Duration::from_millis(100)).await;

        Self {
            dynamodb_client,
            sqs_client,
            table_name,
            queue_url,
        }
    }

    pub fn storage(&self) -> Arc<NotificationStorage> {
        Arc::new(NotificationStorage::new(
            Arc::clone(&self.dynamodb_client),
            self.table_name.clone(),
        ))
    }

    pub fn queue(&self) -> Arc<NotificationQueue> {
        Arc::new(NotificationQueue::new(
            Arc::clone(&self.sqs_client),
            QueueConfig {
                queue_url: self.queue_url.clone(),
                default_max_messages: 10,
                default_visibility_timeout: 60,
                default_wait_time_seconds: 1,
            },
        ))
    }
}

impl Drop for PipelineTestContext {
    fn drop(&mut self) {
        let dynamodb_client = self.dynamodb_client.clone();
        let sqs_client = self.sqs_client.clone();
        let table = self.table_name.clone();
        let queue_url = self.queue_url.clone();

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let _ = dynamodb_client.delete_table().table_name(&table).send().await;
                let _ = sqs_client.delete_queue().queue_url(&queue_url).send().await;
            });
        }
    }
}

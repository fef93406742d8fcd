use std::sync::Arc;

use anyhow::Result;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_sqs::Client as SqsClient;
use notification_storage::notification::NotificationStorage;
use notification_storage::queue::NotificationQueue;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use notification_service::diagnostics::ConsumerDiagnostics;
use notification_service::jwt::JwtManager;
use notification_service::notification_consumer::NotificationConsumer;
use notification_service::notification_processor::NotificationProcessor;
use notification_service::registry::ConnectionRegistry;
use notification_service::server;
use notification_service::types::Environment;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let env = Environment::from_env();
    info!("Starting Notification Service in {:?} environment", env);

    let aws_config = env.aws_config().await;

    // Initialize notification storage
    let dynamodb_client = Arc::new(DynamoDbClient::new(&aws_config));
    let storage = Arc::new(NotificationStorage::new(
        dynamodb_client,
        env.notification_table_name(),
    ));
    info!("✅ Initialized notification storage");

    // Connection registry and the processor both sides feed into
    let registry = Arc::new(ConnectionRegistry::new());
    let processor = Arc::new(NotificationProcessor::new(
        storage.clone(),
        registry.clone(),
    ));

    let jwt_manager = Arc::new(JwtManager::new(&env.jwt_secret())?);

    // Single shutdown token for everything
    let shutdown_token = CancellationToken::new();
    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutting down Notification Service...");
                signal_token.cancel();
            }
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {}", e);
            }
        }
    });

    // Start the queue consumer, unless the queue was never configured;
    // then there is nothing to make progress on and it stays off
    let queue_config = env.notification_queue_config();
    let diagnostics = Arc::new(ConsumerDiagnostics::new(
        queue_config.as_ref().map(|config| config.queue_url.clone()),
    ));

    let consumer_handle = match queue_config {
        Some(config) => {
            let sqs_client = Arc::new(SqsClient::new(&aws_config));
            let queue = Arc::new(NotificationQueue::new(sqs_client, config));
            let consumer = NotificationConsumer::new(
                queue,
                processor.clone(),
                diagnostics.clone(),
                shutdown_token.clone(),
            );
            info!("✅ Initialized queue consumer");
            Some(tokio::spawn(consumer.start()))
        }
        None => {
            warn!("NOTIFICATION_QUEUE_URL is not set, the queue consumer will not run");
            None
        }
    };

    // Start HTTP server (blocks until shutdown)
    let server_result = server::start(
        storage,
        registry,
        processor,
        diagnostics,
        jwt_manager,
        shutdown_token,
    )
    .await;

    // Wait for the consumer to finish
    if let Some(handle) = consumer_handle {
        handle.await.ok();
    }

    info!("✅ Notification Service shutdown complete");
    server_result
}

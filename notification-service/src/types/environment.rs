use std::{env, time::Duration};

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};
use notification_storage::queue::QueueConfig;

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development,
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub const fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            // Regular AWS endpoints for production and staging
            Self::Production | Self::Staging => None,
            // LocalStack endpoint for development
            Self::Development => Some("http://localhost:4566"),
        }
    }

    /// AWS configuration with retry and timeout settings
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_initial_backoff(Duration::from_millis(50));

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// Returns the inbound queue configuration, or `None` when the queue
    /// URL is not configured
    ///
    /// A missing queue URL disables the consumer: it logs once and does
    /// not run, since no progress is possible without a queue.
    #[must_use]
    pub fn notification_queue_config(&self) -> Option<QueueConfig> {
        let queue_url = match self {
            Self::Production | Self::Staging => env::var("NOTIFICATION_QUEUE_URL").ok()?,
            Self::Development => {
                "http://localhost:4566/000000000000/notifications-queue".to_string()
            }
        };

        Some(QueueConfig {
            queue_url,
            default_max_messages: 10,
            default_visibility_timeout: 60, // Redelivery window for unacked messages
            default_wait_time_seconds: 10,  // Long polling for batch receive
        })
    }

    /// Returns the notification table name
    ///
    /// # Panics
    ///
    /// Panics if the `NOTIFICATION_TABLE_NAME` environment variable is not
    /// set in production/staging
    #[must_use]
    pub fn notification_table_name(&self) -> String {
        match self {
            Self::Production | Self::Staging => env::var("NOTIFICATION_TABLE_NAME")
                .expect("NOTIFICATION_TABLE_NAME environment variable is not set"),
            Self::Development => "notifications".to_string(),
        }
    }

    /// Returns the HS256 secret used to validate bearer tokens
    ///
    /// # Panics
    ///
    /// Panics if the `JWT_SECRET` environment variable is not set in
    /// production/staging
    #[must_use]
    pub fn jwt_secret(&self) -> String {
        match self {
            Self::Production | Self::Staging => {
                env::var("JWT_SECRET").expect("JWT_SECRET environment variable is not set")
            }
            Self::Development => {
                env::var("JWT_SECRET").unwrap_or_else(|_| "local-dev-secret".to_string())
            }
        }
    }
}

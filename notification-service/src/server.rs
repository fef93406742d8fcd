use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::Extension;
use notification_storage::notification::NotificationStorage;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::diagnostics::ConsumerDiagnostics;
use crate::jwt::JwtManager;
use crate::notification_processor::NotificationProcessor;
use crate::registry::ConnectionRegistry;
use crate::routes;

/// Starts the server with the given dependencies
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(
    storage: Arc<NotificationStorage>,
    registry: Arc<ConnectionRegistry>,
    processor: Arc<NotificationProcessor>,
    diagnostics: Arc<ConsumerDiagnostics>,
    jwt_manager: Arc<JwtManager>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let router = routes::handler()
        .layer(Extension(storage))
        .layer(Extension(registry))
        .layer(Extension(processor))
        .layer(Extension(diagnostics))
        .layer(Extension(jwt_manager))
        .layer(TraceLayer::new_for_http())
        // Frontends connect from their own origins
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(5),
        ));

    let addr = std::net::SocketAddr::from((
        [0, 0, 0, 0],
        std::env::var("PORT").map_or(Ok(8001), |p| p.parse())?,
    ));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🔄 Notification Service started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
        })
        .await
        .map_err(anyhow::Error::from)
}

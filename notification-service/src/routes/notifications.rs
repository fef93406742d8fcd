//! Notification REST endpoints
//!
//! Listing, unread count and mark-read consume the store directly; the
//! test/dev-send endpoints feed the same processor the queue consumer
//! uses, so the whole persist-and-push path can be exercised without a
//! queue round trip.

use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    Extension, Json,
};
use notification_storage::notification::{Notification, NotificationStorage};
use notification_storage::queue::{InboundMessage, NotificationKind};
use serde::{Deserialize, Serialize};

use crate::diagnostics::{ConsumerDiagnostics, DiagnosticsSnapshot};
use crate::middleware::AuthenticatedUser;
use crate::notification_processor::NotificationProcessor;
use crate::types::AppError;

/// Maximum records returned by the listing endpoint
const LIST_LIMIT: i32 = 50;

#[derive(Debug, Serialize)]
pub struct OkResponse {
    ok: bool,
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    count: usize,
}

#[derive(Debug, Deserialize)]
pub struct DevSendRequest {
    #[serde(rename = "type")]
    kind: NotificationKind,
    #[serde(rename = "userId", default)]
    user_id: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct DevSendResponse {
    ok: bool,
    echo: InboundMessage,
}

fn require_self(user: &AuthenticatedUser, user_id: &str) -> Result<(), AppError> {
    if user.user_id == user_id {
        Ok(())
    } else {
        Err(AppError::new(
            StatusCode::FORBIDDEN,
            "forbidden",
            "Users may only access their own notifications",
            false,
        ))
    }
}

/// Lists a user's notifications; callers only see their own
pub async fn list_user_notifications(
    user: AuthenticatedUser,
    Path(user_id): Path<String>,
    Extension(storage): Extension<Arc<NotificationStorage>>,
) -> Result<Json<Vec<Notification>>, AppError> {
    require_self(&user, &user_id)?;

    let notifications = storage.query_by_user(&user_id, LIST_LIMIT).await?;
    Ok(Json(notifications))
}

/// Counts a user's unread notifications
pub async fn unread_count(
    user: AuthenticatedUser,
    Path(user_id): Path<String>,
    Extension(storage): Extension<Arc<NotificationStorage>>,
) -> Result<Json<UnreadCountResponse>, AppError> {
    require_self(&user, &user_id)?;

    let notifications = storage.query_by_user(&user_id, LIST_LIMIT).await?;
    let count = notifications.iter().filter(|n| !n.read).count();
    Ok(Json(UnreadCountResponse { count }))
}

/// Marks one of the caller's notifications as read (idempotent)
pub async fn mark_notification_read(
    user: AuthenticatedUser,
    Path(notification_id): Path<String>,
    Extension(storage): Extension<Arc<NotificationStorage>>,
) -> Result<Json<OkResponse>, AppError> {
    storage.mark_read(&user.user_id, &notification_id).await?;
    Ok(Json(OkResponse { ok: true }))
}

/// Creates a canned test notification for the caller and runs it through
/// the full persist-and-push flow
pub async fn create_test_notification(
    user: AuthenticatedUser,
    Extension(processor): Extension<Arc<NotificationProcessor>>,
) -> Result<Json<OkResponse>, AppError> {
    let msg = InboundMessage {
        kind: NotificationKind::WordSaved,
        user_id: Some(user.user_id),
        data: Some(serde_json::json!({"word": "hola"})),
    };

    processor.process(msg).await?;
    Ok(Json(OkResponse { ok: true }))
}

/// Sends an arbitrary notification for the given user (or the caller if
/// no `userId` is supplied); dev/test tooling only
pub async fn dev_send(
    user: AuthenticatedUser,
    Extension(processor): Extension<Arc<NotificationProcessor>>,
    Json(body): Json<DevSendRequest>,
) -> Result<Json<DevSendResponse>, AppError> {
    let msg = InboundMessage {
        kind: body.kind,
        user_id: Some(body.user_id.unwrap_or(user.user_id)),
        data: body.data,
    };

    processor.process(msg.clone()).await?;
    Ok(Json(DevSendResponse { ok: true, echo: msg }))
}

/// Returns the queue consumer's diagnostics snapshot
pub async fn consumer_status(
    Extension(diagnostics): Extension<Arc<ConsumerDiagnostics>>,
) -> Json<DiagnosticsSnapshot> {
    Json(diagnostics.snapshot())
}

//! Real-time notification WebSocket
//!
//! Clients connect with `GET /ws/notifications?token=<JWT>`. The token is
//! validated before the upgrade; after it, the connection is registered
//! under the token's subject and stays registered until the peer goes
//! away.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::jwt::JwtManager;
use crate::registry::ConnectionRegistry;
use crate::types::AppError;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    token: String,
}

/// WebSocket upgrade handler
///
/// Rejects the upgrade with 401 when the token does not validate; the
/// browser WebSocket API cannot send an Authorization header, hence the
/// query parameter.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    Extension(jwt_manager): Extension<Arc<JwtManager>>,
    Extension(registry): Extension<Arc<ConnectionRegistry>>,
) -> Response {
    let claims = match jwt_manager.decode(&params.token) {
        Ok(claims) => claims,
        Err(e) => {
            warn!(error = %e, "WebSocket connection attempt with invalid token");
            return AppError::new(
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Invalid or expired token",
                false,
            )
            .into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, claims.subject, registry))
}

/// Handles an established WebSocket connection
async fn handle_socket(socket: WebSocket, user_id: String, registry: Arc<ConnectionRegistry>) {
    let (connection_id, mut payload_rx) = registry.connect(&user_id).await;
    let connections = registry.connection_count(&user_id).await;
    debug!(user_id, connections, "WebSocket connected");

    let (mut ws_sink, mut ws_stream) = socket.split();

    // Forward registry payloads to the socket as JSON text frames
    let forward_handle = tokio::spawn(async move {
        while let Some(payload) = payload_rx.recv().await {
            let text = match serde_json::to_string(&payload) {
                Ok(text) => text,
                Err(e) => {
                    error!(error = %e, "Failed to serialize push payload");
                    continue;
                }
            };
            if ws_sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Drain inbound frames until the peer goes away; clients may ping or
    // send keepalive text, none of it is interpreted
    while let Some(frame) = ws_stream.next().await {
        match frame {
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }

    registry.disconnect(&user_id, connection_id).await;
    forward_handle.abort();
    debug!(user_id, "WebSocket disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<F, Fut>(_: F)
    where
        F: FnOnce(WebSocket, String, Arc<ConnectionRegistry>) -> Fut,
        Fut: std::future::Future<Output = ()> + Send,
    {
    }

    // The upgrade callback requires a Send future; awaiting inside a
    // tracing macro's field expression breaks that
    #[test]
    fn connection_task_future_is_send() {
        assert_send(handle_socket);
    }
}

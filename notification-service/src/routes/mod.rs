mod health;
mod notifications;
mod websocket;

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};

/// Creates the router with all handler routes
pub fn handler() -> Router {
    let authed = Router::new()
        .route("/user/{user_id}", get(notifications::list_user_notifications))
        .route("/unread-count/{user_id}", get(notifications::unread_count))
        .route(
            "/mark-read/{notification_id}",
            post(notifications::mark_notification_read),
        )
        .route("/test", post(notifications::create_test_notification))
        .route("/dev-send", post(notifications::dev_send))
        .route_layer(from_fn(crate::middleware::auth_middleware));

    let notifications = authed.route(
        "/debug/consumer-status",
        get(notifications::consumer_status),
    );

    Router::new()
        .route("/health", get(health::handler))
        .route("/ws/notifications", get(websocket::ws_handler))
        .nest("/notifications", notifications)
}

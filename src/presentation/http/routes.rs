//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::{auth_middleware, track_metrics};
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn(track_metrics))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// API v1 routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Public routes
        .nest("/auth", auth_routes(state.clone()))
        // Protected routes (require authentication)
        .merge(protected_routes(state))
}

/// Authentication routes; only `/me` needs a token
fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/me",
            get(handlers::auth::me)
                .route_layer(middleware::from_fn_with_state(state, auth_middleware)),
        )
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/servers", server_routes())
        .nest("/categories", category_routes())
        .nest("/channels", channel_routes(&state))
        .nest("/messages", message_routes())
        .nest("/attachments", attachment_routes())
        .nest("/chat", chat_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Server routes
fn server_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::server::list_servers).post(handlers::server::create_server),
        )
        .route("/{server_id}/join", post(handlers::server::join_server))
        .route(
            "/{server_id}/channels",
            get(handlers::server::list_channels).post(handlers::server::create_channel),
        )
        .route(
            "/{server_id}/categories",
            get(handlers::server::list_categories).post(handlers::server::create_category),
        )
}

/// Category routes
fn category_routes() -> Router<AppState> {
    Router::new().route(
        "/{category_id}/channels",
        get(handlers::server::list_category_channels),
    )
}

/// Channel routes
fn channel_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/{channel_id}/members", post(handlers::channel::add_member))
        .route("/{channel_id}/category", put(handlers::channel::update_category))
        .route(
            "/{channel_id}/messages",
            get(handlers::message::get_messages).post(handlers::message::send_message),
        )
        .layer(DefaultBodyLimit::max(state.settings.storage.max_upload_bytes))
}

/// Message routes
fn message_routes() -> Router<AppState> {
    Router::new().route(
        "/{message_id}",
        put(handlers::message::edit_message).delete(handlers::message::delete_message),
    )
}

/// Attachment routes
fn attachment_routes() -> Router<AppState> {
    Router::new().route(
        "/{attachment_id}",
        get(handlers::message::download_attachment),
    )
}

/// AI chat routes
fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::chat::create_chat))
        .route("/history", get(handlers::chat::history))
        .route(
            "/{chat_id}",
            get(handlers::chat::get_chat).post(handlers::chat::add_message),
        )
}

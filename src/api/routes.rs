//! Route configuration

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{self, AppState};
use crate::webhook::{build_webhook_routes, WebhookState};

/// Build the application router
pub fn build_router(state: AppState, webhook_state: WebhookState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/upload", post(handlers::upload))
        .route("/github-info", get(handlers::github_info))
        .route("/github-config", get(handlers::github_config_page))
        .route("/create-webhook", post(handlers::create_webhook))
        .route("/extractions", get(handlers::list_extractions))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .merge(build_webhook_routes(webhook_state))
        // Enforced inside the extractors so /upload can answer with a fragment
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

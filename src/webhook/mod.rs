//! Inbound GitHub webhooks
//!
//! Deliveries must carry a valid `X-Hub-Signature-256` computed with the
//! shared `WEBHOOK_SECRET`. Accepted events are logged and acknowledged;
//! nothing is persisted.

pub mod events;
pub mod handlers;
pub mod signature;

use axum::{routing::post, Router};

pub use events::{WebhookAck, WebhookEvent, WebhookPayload};
pub use handlers::WebhookState;
pub use signature::{sign, WebhookError, WebhookVerifier, SIGNATURE_HEADER};

/// Build webhook routes
pub fn build_webhook_routes(state: WebhookState) -> Router {
    Router::new()
        .route("/webhook", post(handlers::github_webhook))
        .with_state(state)
}

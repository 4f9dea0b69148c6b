//! Webhook receiver

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use tracing::{info, warn};

use super::events::{WebhookAck, WebhookEvent, WebhookPayload};
use super::signature::{WebhookError, WebhookVerifier, SIGNATURE_HEADER};
use crate::metrics::METRICS;

const EVENT_HEADER: &str = "X-GitHub-Event";

/// Application state for webhook handlers
#[derive(Clone)]
pub struct WebhookState {
    pub verifier: Arc<WebhookVerifier>,
}

fn status_for(error: &WebhookError) -> StatusCode {
    match error {
        WebhookError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        WebhookError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::UNAUTHORIZED,
    }
}

/// Receive a GitHub delivery
///
/// POST /webhook
pub async fn github_webhook(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, (StatusCode, Json<WebhookAck>)> {
    let event_name = headers
        .get(EVENT_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());

    let reject = |e: WebhookError| {
        METRICS.record_webhook(&event_name, "rejected");
        warn!("Rejected {} webhook: {}", event_name, e);
        (status_for(&e), Json(WebhookAck::error(e.to_string())))
    };

    state
        .verifier
        .verify(signature, &body)
        .map_err(&reject)?;
    let payload = WebhookPayload::parse(&body).map_err(&reject)?;

    let repository = payload
        .repository
        .as_ref()
        .map(|r| r.full_name.as_str())
        .unwrap_or("unknown");
    info!(
        "Received GitHub webhook: event={} action={} repository={}",
        event_name,
        payload.action.as_deref().unwrap_or("unknown"),
        repository
    );

    if event_name == "push" {
        info!(
            "Push to {} with {} commit(s)",
            payload.git_ref.as_deref().unwrap_or("unknown ref"),
            payload.commits.as_ref().map_or(0, Vec::len)
        );
    }

    let event = WebhookEvent::classify(&payload);
    METRICS.record_webhook(&event_name, "accepted");

    Ok(Json(WebhookAck::success(event.acknowledgement())))
}

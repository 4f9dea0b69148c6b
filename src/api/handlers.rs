//! HTTP handlers for the upload UI and GitHub endpoints

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::render::{AlertLevel, PageRenderer};
use crate::error::{AppError, ErrorKind};
use crate::github::{GitHubClient, GitHubConfig, RepoStatus, WebhookRegistration};
use crate::metrics::METRICS;
use crate::store::StoredExtraction;
use crate::upload::{UploadOrchestrator, UploadedDocument};

const WEBHOOK_EVENTS: &[&str] = &["push", "pull_request"];
const DEFAULT_EXTRACTION_LIMIT: usize = 10;
const MAX_EXTRACTION_LIMIT: usize = 100;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: UploadOrchestrator,
    pub github: Option<Arc<GitHubClient>>,
    pub github_config: Arc<GitHubConfig>,
    pub renderer: Arc<PageRenderer>,
}

/// Last-resort fragment when a template itself fails
fn fallback_alert(message: &str) -> String {
    format!(
        "<div class=\"alert alert-danger\">{}</div>",
        message.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
    )
}

fn render_error(e: minijinja::Error) -> (StatusCode, Html<String>) {
    error!("Template rendering failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(fallback_alert("Page could not be rendered")),
    )
}

async fn repo_status(state: &AppState) -> RepoStatus {
    let Some(client) = &state.github else {
        return RepoStatus::disconnected("GitHub not configured");
    };

    match client.get_repository().await {
        Ok(repo) => RepoStatus::connected(&repo),
        Err(e) => {
            warn!("Repository lookup failed: {}", e);
            RepoStatus::disconnected(format!("Error connecting to repository: {}", e))
        }
    }
}

/// Upload form
///
/// GET /
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let status = repo_status(&state).await;
    state.renderer.index(&status).map(Html).map_err(render_error)
}

/// Configuration instructions
///
/// GET /github-config
pub async fn github_config_page(
    State(state): State<AppState>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    state
        .renderer
        .github_config(&state.github_config)
        .map(Html)
        .map_err(render_error)
}

/// Repository connection status
///
/// GET /github-info
pub async fn github_info(State(state): State<AppState>) -> Json<RepoStatus> {
    Json(repo_status(&state).await)
}

/// Register the repository webhook pointing back at this service
///
/// POST /create-webhook
pub async fn create_webhook(State(state): State<AppState>) -> Json<WebhookRegistration> {
    let failure = |message: String| {
        Json(WebhookRegistration {
            success: false,
            webhook_id: None,
            message: Some(message),
        })
    };

    let Some(client) = &state.github else {
        return failure("GitHub not configured".to_string());
    };
    let Some(url) = state.github_config.webhook_url() else {
        return failure(
            "Public URL not configured. Please set PUBLIC_BASE_URL or RAILWAY_PUBLIC_DOMAIN.".to_string(),
        );
    };
    let Some(secret) = &state.github_config.webhook_secret else {
        return failure("Webhook secret is not configured. Please set WEBHOOK_SECRET.".to_string());
    };

    match client.create_webhook(&url, secret, WEBHOOK_EVENTS).await {
        Ok(hook) => {
            info!("Webhook {} delivers to {}", hook.id, url);
            Json(WebhookRegistration {
                success: true,
                webhook_id: Some(hook.id),
                message: None,
            })
        }
        Err(e) => failure(format!("Error creating webhook: {}", e)),
    }
}

/// Pull the `file` part and the `sync_github` flag out of the form
async fn read_upload_form(mut multipart: Multipart) -> Result<(Option<UploadedDocument>, bool), String> {
    let mut document = None;
    let mut sync_requested = false;

    while let Some(field) = multipart.next_field().await.map_err(|e| e.body_text())? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| e.body_text())?;
                if !filename.is_empty() {
                    document = Some(UploadedDocument::new(filename, bytes));
                }
            }
            Some("sync_github") => sync_requested = true,
            _ => {}
        }
    }

    Ok((document, sync_requested))
}

fn error_fragment(renderer: &PageRenderer, e: &AppError) -> String {
    let (level, message) = match e.kind() {
        ErrorKind::UserInput => (AlertLevel::Warning, e.to_string()),
        _ => (AlertLevel::Danger, format!("Error processing file: {}", e)),
    };

    renderer.alert(level, &message).unwrap_or_else(|render_err| {
        error!("Template rendering failed: {}", render_err);
        fallback_alert(&message)
    })
}

/// Extract text from an uploaded image or PDF and optionally sync it
///
/// POST /upload
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Html<String> {
    let renderer = &state.renderer;

    let form = match multipart {
        Ok(multipart) => read_upload_form(multipart).await,
        Err(rejection) => Err(rejection.body_text()),
    };
    let (document, sync_requested) = match form {
        Ok(form) => form,
        Err(message) => {
            warn!("Unreadable upload form: {}", message);
            return Html(error_fragment(renderer, &AppError::InvalidUpload(message)));
        }
    };

    match state.orchestrator.handle_upload(document, sync_requested).await {
        Ok(report) => Html(renderer.upload_result(&report).unwrap_or_else(|e| {
            error!("Template rendering failed: {}", e);
            fallback_alert("Text was extracted but the result could not be rendered")
        })),
        Err(e) => Html(error_fragment(renderer, &e)),
    }
}

#[derive(Debug, Deserialize)]
pub struct ExtractionsQuery {
    pub limit: Option<usize>,
}

/// Recent extractions, newest first
///
/// GET /extractions
pub async fn list_extractions(
    State(state): State<AppState>,
    Query(query): Query<ExtractionsQuery>,
) -> Json<Vec<StoredExtraction>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_EXTRACTION_LIMIT)
        .min(MAX_EXTRACTION_LIMIT);
    Json(state.orchestrator.store().recent(limit).await)
}

/// Health check endpoint
///
/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let store = state.orchestrator.store().stats().await;
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "github_configured": state.github.is_some(),
        "store": store,
    }))
}

/// Prometheus metrics
///
/// GET /metrics
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        METRICS.export_prometheus(),
    )
}

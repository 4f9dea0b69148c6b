//! Wiring of clients, pipeline and routes from configuration

use axum::Router;
use std::sync::Arc;
use tracing::info;

use super::handlers::AppState;
use super::render::PageRenderer;
use super::routes::build_router;
use crate::config::Config;
use crate::error::Result;
use crate::github::{GitHubClient, GitHubSync};
use crate::ocr::GeminiOcrClient;
use crate::store::ContentStore;
use crate::upload::UploadOrchestrator;
use crate::webhook::{WebhookState, WebhookVerifier};

/// Build the shared handler state from configuration
pub fn init_app_state(config: &Config) -> Result<AppState> {
    let extractor = Arc::new(GeminiOcrClient::new(config.ocr.clone())?);
    if config.ocr.api_key.is_none() {
        info!("GEMINI_API_KEY is not set; uploads will fail until it is configured");
    }

    let github = if config.github.is_configured() {
        let client = GitHubClient::new(&config.github)?;
        info!("GitHub sync enabled for {}/{}", client.owner(), client.repo());
        Some(Arc::new(client))
    } else {
        info!("GitHub not configured; sync and repository status are disabled");
        None
    };

    let sync = Arc::new(GitHubSync::new(github.clone(), config.github.clone()));
    let store = ContentStore::new(config.store.clone());

    Ok(AppState {
        orchestrator: UploadOrchestrator::new(extractor, sync, store),
        github,
        github_config: Arc::new(config.github.clone()),
        renderer: Arc::new(PageRenderer::new()?),
    })
}

pub fn init_webhook_state(config: &Config) -> WebhookState {
    let verifier = WebhookVerifier::new(config.github.webhook_secret.clone());
    if !verifier.is_configured() {
        info!("WEBHOOK_SECRET is not set; webhook deliveries will be refused");
    }

    WebhookState {
        verifier: Arc::new(verifier),
    }
}

/// Build the complete application router
pub fn build_app(config: &Config) -> Result<Router> {
    let state = init_app_state(config)?;
    let webhook_state = init_webhook_state(config);
    Ok(build_router(state, webhook_state, config.server.max_upload_bytes))
}

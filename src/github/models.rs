//! GitHub REST payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub login: String,
}

/// Subset of `GET /repos/{owner}/{repo}`
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub owner: Owner,
    #[serde(default)]
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Subset of `GET /repos/{owner}/{repo}/contents/{path}` for a file
#[derive(Debug, Clone, Deserialize)]
pub struct ContentFile {
    pub path: String,
    pub sha: String,
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`
#[derive(Debug, Clone, Serialize)]
pub struct PutContentRequest {
    pub message: String,
    /// Base64 encoded file content
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommittedContent {
    pub path: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Response of a contents PUT
#[derive(Debug, Clone, Deserialize)]
pub struct PutContentResponse {
    pub content: CommittedContent,
}

#[derive(Debug, Clone, Serialize)]
pub struct HookConfig {
    pub url: String,
    pub content_type: String,
    pub secret: String,
}

/// Body of `POST /repos/{owner}/{repo}/hooks`
#[derive(Debug, Clone, Serialize)]
pub struct CreateHookRequest {
    pub name: String,
    pub active: bool,
    pub events: Vec<String>,
    pub config: HookConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hook {
    pub id: u64,
}

/// GitHub error body
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}

/// Repository connection status served by `GET /github-info`
#[derive(Debug, Clone, Serialize, Default)]
pub struct RepoStatus {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RepoStatus {
    pub fn connected(repo: &Repository) -> Self {
        Self {
            connected: true,
            repo_name: Some(repo.name.clone()),
            repo_url: Some(repo.html_url.clone()),
            owner: Some(repo.owner.login.clone()),
            description: Some(
                repo.description
                    .clone()
                    .filter(|d| !d.is_empty())
                    .unwrap_or_else(|| "No description".to_string()),
            ),
            last_updated: Some(repo.updated_at.format("%Y-%m-%d %H:%M:%S").to_string()),
            message: None,
        }
    }

    pub fn disconnected(message: impl Into<String>) -> Self {
        Self {
            connected: false,
            message: Some(message.into()),
            ..Default::default()
        }
    }
}

/// Outcome of `POST /create-webhook`
#[derive(Debug, Clone, Serialize)]
pub struct WebhookRegistration {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

//! One-way sync of extracted text into the repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::client::{GitHubClient, GitHubError};
use super::config::GitHubConfig;
use crate::error::ErrorKind;
use crate::metrics::METRICS;

/// Outcome of a sync attempt, rendered next to the extraction
#[derive(Debug, Clone, Serialize)]
pub struct SyncResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(skip)]
    pub error_kind: Option<ErrorKind>,
}

impl SyncResult {
    pub fn synced(file_url: String) -> Self {
        Self {
            success: true,
            message: "Content synced to GitHub successfully!".to_string(),
            file_url: Some(file_url),
            error_kind: None,
        }
    }

    pub fn failed(error: &GitHubError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            file_url: None,
            error_kind: Some(error.kind()),
        }
    }
}

/// Destination for extracted text
#[async_trait]
pub trait ContentSync: Send + Sync {
    async fn sync(&self, content: &str, filename: &str, file_type: &str) -> SyncResult;
}

/// Commits each extraction as a new text file in the configured repository
pub struct GitHubSync {
    client: Option<Arc<GitHubClient>>,
    config: GitHubConfig,
}

impl GitHubSync {
    pub fn new(client: Option<Arc<GitHubClient>>, config: GitHubConfig) -> Self {
        Self { client, config }
    }

    async fn commit(
        &self,
        client: &GitHubClient,
        content: &str,
        filename: &str,
        file_type: &str,
    ) -> Result<String, GitHubError> {
        let path = target_path(&self.config.content_dir, filename, Utc::now());
        let message = format!("Add extracted content from {} - {}", filename, file_type);

        let sha = client.get_file(&path).await?.map(|existing| existing.sha);
        if sha.is_some() {
            info!("Updating existing file {}", path);
        }

        let committed = client.put_file(&path, &message, content, sha).await?;

        Ok(committed.content.html_url.unwrap_or_else(|| {
            format!(
                "{}/{}/{}/blob/{}/{}",
                self.config.web_url.trim_end_matches('/'),
                client.owner(),
                client.repo(),
                client.branch(),
                committed.content.path
            )
        }))
    }
}

#[async_trait]
impl ContentSync for GitHubSync {
    #[instrument(skip(self, content), fields(chars = content.len()))]
    async fn sync(&self, content: &str, filename: &str, file_type: &str) -> SyncResult {
        let Some(client) = &self.client else {
            METRICS.record_sync("unconfigured");
            return SyncResult::failed(&GitHubError::NotConfigured);
        };

        match self.commit(client, content, filename, file_type).await {
            Ok(url) => {
                METRICS.record_sync("success");
                info!("Synced {} to {}", filename, url);
                SyncResult::synced(url)
            }
            Err(e) => {
                METRICS.record_sync("error");
                warn!("Sync of {} failed: {}", filename, e);
                SyncResult::failed(&e)
            }
        }
    }
}

/// Keep alphanumerics, space, `-`, `_` and `.`; trim trailing whitespace
pub fn sanitize_filename(filename: &str) -> String {
    let kept: String = filename
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.'))
        .collect();
    let trimmed = kept.trim_end();

    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `{dir}/{sanitized}_{YYYYMMDD_HHMMSS}.txt`
pub fn target_path(content_dir: &str, filename: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}/{}_{}.txt",
        content_dir.trim_matches('/'),
        sanitize_filename(filename),
        at.format("%Y%m%d_%H%M%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("report v2 (final).pdf"), "report v2 final.pdf");
        assert_eq!(sanitize_filename("a/b*c.png"), "abc.png");
        assert_eq!(sanitize_filename("notes_2024-03.png  "), "notes_2024-03.png");
        assert_eq!(sanitize_filename("***"), "upload");
    }

    #[test]
    fn test_target_path() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap();
        assert_eq!(
            target_path("extracted_content/", "scan.png", at),
            "extracted_content/scan.png_20240301_123045.txt"
        );
    }

    #[tokio::test]
    async fn test_unconfigured_sync_fails_without_client() {
        let sync = GitHubSync::new(None, GitHubConfig::default());

        let result = sync.sync("text", "doc.pdf", "pdf").await;

        assert!(!result.success);
        assert!(result.message.starts_with("GitHub not configured"));
        assert_eq!(result.error_kind, Some(ErrorKind::Configuration));
        assert!(result.file_url.is_none());
    }

    #[test]
    fn test_result_serialization_skips_kind() {
        let json = serde_json::to_value(SyncResult::synced("https://x".to_string())).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["file_url"], "https://x");
        assert!(json.get("error_kind").is_none());
    }
}

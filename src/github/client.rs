//! GitHub REST client for repository contents and webhooks

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use std::time::Instant;
use tracing::{debug, error, info};

use super::config::GitHubConfig;
use super::models::*;
use crate::error::ErrorKind;
use crate::metrics::METRICS;

const USER_AGENT: &str = concat!("ocr-sync/", env!("CARGO_PKG_VERSION"));

/// GitHub API error types
#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    #[error("GitHub not configured. Please set GITHUB_TOKEN and GITHUB_REPO_OWNER environment variables.")]
    NotConfigured,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("GitHub rejected the credentials ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl GitHubError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConfigured => ErrorKind::Configuration,
            _ => ErrorKind::ExternalService,
        }
    }

    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else {
            Self::Request(e.to_string())
        }
    }
}

/// Authenticated client bound to one repository
pub struct GitHubClient {
    http: Client,
    token: SecretString,
    owner: String,
    repo: String,
    api_url: String,
    branch: String,
}

impl GitHubClient {
    /// Create a client; fails with [`GitHubError::NotConfigured`] without token and owner
    pub fn new(config: &GitHubConfig) -> Result<Self, GitHubError> {
        let (token, owner) = match (&config.token, &config.owner) {
            (Some(token), Some(owner)) if !owner.is_empty() => (token.clone(), owner.clone()),
            _ => return Err(GitHubError::NotConfigured),
        };

        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| GitHubError::Request(e.to_string()))?;

        Ok(Self {
            http,
            token,
            owner,
            repo: config.repo_name.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            branch: config.branch.clone(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Build `{api}/repos/{owner}/{repo}/{segments...}` with each segment percent-encoded
    fn repo_url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, GitHubError> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| GitHubError::Request(format!("invalid API url {}: {}", self.api_url, e)))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| GitHubError::Request(format!("API url cannot be a base: {}", self.api_url)))?;
            path.pop_if_empty()
                .extend(["repos", self.owner.as_str(), self.repo.as_str()])
                .extend(segments);
        }
        Ok(url)
    }

    fn contents_url(&self, path: &str) -> Result<Url, GitHubError> {
        self.repo_url(std::iter::once("contents").chain(path.split('/')))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(self.token.expose_secret())
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    /// Send a request and map non-success statuses to [`GitHubError`]
    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response, GitHubError> {
        let start = Instant::now();

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                METRICS.record_github(operation, false, start.elapsed());
                return Err(GitHubError::from_reqwest(e));
            }
        };

        let status = response.status();
        if status.is_success() {
            METRICS.record_github(operation, true, start.elapsed());
            return Ok(response);
        }

        METRICS.record_github(operation, false, start.elapsed());
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or_else(|_| body.trim().to_string());

        Err(match status {
            StatusCode::NOT_FOUND => GitHubError::NotFound(message),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GitHubError::Unauthorized {
                status: status.as_u16(),
                message,
            },
            _ => GitHubError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, GitHubError> {
        response
            .json()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GitHubError::Timeout(e.to_string())
                } else {
                    GitHubError::InvalidResponse(e.to_string())
                }
            })
    }

    /// Fetch repository metadata
    pub async fn get_repository(&self) -> Result<Repository, GitHubError> {
        let url = self.repo_url(std::iter::empty())?;
        let response = self.send("get_repo", self.request(Method::GET, url)).await?;
        Self::decode(response).await
    }

    /// Fetch a file's metadata; `Ok(None)` only when GitHub answers 404
    pub async fn get_file(&self, path: &str) -> Result<Option<ContentFile>, GitHubError> {
        let url = self.contents_url(path)?;
        let request = self
            .request(Method::GET, url)
            .query(&[("ref", self.branch.as_str())]);

        match self.send("get_contents", request).await {
            Ok(response) => Ok(Some(Self::decode(response).await?)),
            Err(GitHubError::NotFound(_)) => {
                debug!("No existing file at {}", path);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Create a file, or update it when the current blob `sha` is given
    pub async fn put_file(
        &self,
        path: &str,
        message: &str,
        content: &str,
        sha: Option<String>,
    ) -> Result<PutContentResponse, GitHubError> {
        let url = self.contents_url(path)?;
        let body = PutContentRequest {
            message: message.to_string(),
            content: STANDARD.encode(content.as_bytes()),
            sha,
            branch: Some(self.branch.clone()),
        };

        let response = self
            .send("put_contents", self.request(Method::PUT, url).json(&body))
            .await?;
        let committed: PutContentResponse = Self::decode(response).await?;

        info!("Committed {} to {}/{}", committed.content.path, self.owner, self.repo);
        Ok(committed)
    }

    /// Register a JSON webhook for the given events
    pub async fn create_webhook(
        &self,
        url: &str,
        secret: &SecretString,
        events: &[&str],
    ) -> Result<Hook, GitHubError> {
        let endpoint = self.repo_url(["hooks"])?;
        let body = CreateHookRequest {
            name: "web".to_string(),
            active: true,
            events: events.iter().map(|e| e.to_string()).collect(),
            config: HookConfig {
                url: url.to_string(),
                content_type: "json".to_string(),
                secret: secret.expose_secret().clone(),
            },
        };

        let response = self
            .send("create_hook", self.request(Method::POST, endpoint).json(&body))
            .await
            .map_err(|e| {
                error!("Webhook registration failed: {}", e);
                e
            })?;
        let hook: Hook = Self::decode(response).await?;

        info!("Registered webhook {} for {}/{}", hook.id, self.owner, self.repo);
        Ok(hook)
    }
}

//! GitHub integration configuration

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

/// GitHub repository, credentials and webhook settings
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubConfig {
    /// Personal access token (env GITHUB_TOKEN)
    #[serde(default)]
    pub token: Option<SecretString>,

    /// Repository owner (env GITHUB_REPO_OWNER)
    #[serde(default)]
    pub owner: Option<String>,

    /// Repository name (env GITHUB_REPO_NAME)
    #[serde(default = "default_repo_name")]
    pub repo_name: String,

    /// REST API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Browsable web base URL
    #[serde(default = "default_web_url")]
    pub web_url: String,

    /// Branch used for browsable file links
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Directory extracted files are committed into
    #[serde(default = "default_content_dir")]
    pub content_dir: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Public URL of this service, used when registering the webhook
    #[serde(default)]
    pub public_base_url: Option<String>,

    /// Shared secret for webhook signatures
    #[serde(default)]
    pub webhook_secret: Option<SecretString>,
}

fn default_repo_name() -> String {
    "busyness-chatbot".to_string()
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_web_url() -> String {
    "https://github.com".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_content_dir() -> String {
    "extracted_content".to_string()
}

fn default_timeout_ms() -> u64 {
    15_000
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            owner: None,
            repo_name: default_repo_name(),
            api_url: default_api_url(),
            web_url: default_web_url(),
            branch: default_branch(),
            content_dir: default_content_dir(),
            timeout_ms: default_timeout_ms(),
            public_base_url: None,
            webhook_secret: None,
        }
    }
}

/// Read a variable, treating blank values as unset
fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl GitHubConfig {
    /// Load from environment variables
    pub fn from_env(mut self) -> Self {
        if let Some(val) = non_empty_env("GITHUB_TOKEN") {
            self.token = Some(SecretString::new(val));
        }

        if let Some(val) = non_empty_env("GITHUB_REPO_OWNER") {
            self.owner = Some(val);
        }

        if let Some(val) = non_empty_env("GITHUB_REPO_NAME") {
            self.repo_name = val;
        }

        if let Some(val) = non_empty_env("GITHUB_API_URL") {
            self.api_url = val;
        }

        if let Some(val) = non_empty_env("GITHUB_BRANCH") {
            self.branch = val;
        }

        if let Some(val) = non_empty_env("GITHUB_TIMEOUT_MS") {
            if let Ok(ms) = val.parse() {
                self.timeout_ms = ms;
            }
        }

        if let Some(val) = non_empty_env("PUBLIC_BASE_URL").or_else(|| non_empty_env("RAILWAY_PUBLIC_DOMAIN")) {
            self.public_base_url = Some(val);
        }

        if let Some(val) = non_empty_env("WEBHOOK_SECRET") {
            self.webhook_secret = Some(SecretString::new(val));
        }

        self
    }

    /// Token and owner are both present
    pub fn is_configured(&self) -> bool {
        self.token.is_some() && self.owner.as_deref().is_some_and(|o| !o.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Webhook delivery URL, `https://` assumed for bare domains
    pub fn webhook_url(&self) -> Option<String> {
        let base = self.public_base_url.as_deref()?.trim().trim_end_matches('/');
        if base.is_empty() {
            return None;
        }
        if base.starts_with("http://") || base.starts_with("https://") {
            Some(format!("{}/webhook", base))
        } else {
            Some(format!("https://{}/webhook", base))
        }
    }
}

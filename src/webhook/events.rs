//! Webhook payload classification

use serde::{Deserialize, Serialize};

use super::signature::WebhookError;

#[derive(Debug, Clone, Deserialize)]
pub struct IssueRef {
    pub number: u64,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryRef {
    pub full_name: String,
}

/// The fields of a delivery this service looks at
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub pull_request: Option<IssueRef>,
    #[serde(default)]
    pub issue: Option<IssueRef>,
    #[serde(default, rename = "ref")]
    pub git_ref: Option<String>,
    #[serde(default)]
    pub commits: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub repository: Option<RepositoryRef>,
}

impl WebhookPayload {
    pub fn parse(body: &[u8]) -> Result<Self, WebhookError> {
        serde_json::from_slice(body).map_err(|e| WebhookError::MalformedPayload(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    PullRequestOpened { number: u64, title: String },
    IssueCreated { number: u64, title: String },
    Other,
}

impl WebhookEvent {
    pub fn classify(payload: &WebhookPayload) -> Self {
        match (payload.action.as_deref(), &payload.pull_request, &payload.issue) {
            (Some("opened"), Some(pr), _) => Self::PullRequestOpened {
                number: pr.number,
                title: pr.title.clone(),
            },
            (Some("created"), _, Some(issue)) => Self::IssueCreated {
                number: issue.number,
                title: issue.title.clone(),
            },
            _ => Self::Other,
        }
    }

    pub fn acknowledgement(&self) -> String {
        match self {
            Self::PullRequestOpened { number, title } => {
                format!("Pull request #{} opened: {}", number, title)
            }
            Self::IssueCreated { number, title } => format!("Issue #{} created: {}", number, title),
            Self::Other => "Webhook received".to_string(),
        }
    }
}

/// JSON reply to a delivery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub status: String,
    pub message: String,
}

impl WebhookAck {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}

//! GitHub repository integration: REST client, content sync and status

pub mod client;
pub mod config;
pub mod models;
pub mod sync;

pub use client::{GitHubClient, GitHubError};
pub use config::GitHubConfig;
pub use models::{RepoStatus, WebhookRegistration};
pub use sync::{sanitize_filename, target_path, ContentSync, GitHubSync, SyncResult};

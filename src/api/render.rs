//! HTML rendering with minijinja
//!
//! Templates are compiled into the binary and registered once. Names end in
//! `.html`, so every interpolated value is HTML-escaped.

use minijinja::{context, Environment};
use serde::Serialize;

use crate::github::{GitHubConfig, RepoStatus};
use crate::upload::UploadReport;

const APP_NAME: &str = "Busyness Chatbot";
const ACCEPTED_EXTENSIONS: &str = ".jpg,.jpeg,.png,.gif,.bmp,.pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Danger,
}

/// One row of the configuration page
#[derive(Debug, Serialize)]
struct EnvVariable {
    name: &'static str,
    description: &'static str,
    example: &'static str,
    is_set: bool,
}

pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("base.html", include_str!("../../templates/base.html"))?;
        env.add_template("index.html", include_str!("../../templates/index.html"))?;
        env.add_template("github_config.html", include_str!("../../templates/github_config.html"))?;
        env.add_template("upload_result.html", include_str!("../../templates/upload_result.html"))?;
        env.add_template("alert.html", include_str!("../../templates/alert.html"))?;
        Ok(Self { env })
    }

    fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(ctx)
    }

    /// Upload form with the repository badge
    pub fn index(&self, github: &RepoStatus) -> Result<String, minijinja::Error> {
        self.render(
            "index.html",
            context! {
                app_name => APP_NAME,
                accept => ACCEPTED_EXTENSIONS,
                github => github,
            },
        )
    }

    /// Setup instructions; only reports whether each variable is set
    pub fn github_config(&self, config: &GitHubConfig) -> Result<String, minijinja::Error> {
        let variables = [
            EnvVariable {
                name: "GITHUB_TOKEN",
                description: "Your GitHub Personal Access Token",
                example: "ghp_xxxxxxxxxxxxxxxxxxxx",
                is_set: config.token.is_some(),
            },
            EnvVariable {
                name: "GITHUB_REPO_OWNER",
                description: "Your GitHub username",
                example: "yourusername",
                is_set: config.owner.is_some(),
            },
            EnvVariable {
                name: "GITHUB_REPO_NAME",
                description: "Repository name (optional)",
                example: "busyness-chatbot",
                is_set: std::env::var_os("GITHUB_REPO_NAME").is_some(),
            },
            EnvVariable {
                name: "PUBLIC_BASE_URL",
                description: "Public URL of this service, used for the webhook (falls back to RAILWAY_PUBLIC_DOMAIN)",
                example: "ocr.example.com",
                is_set: config.public_base_url.is_some(),
            },
            EnvVariable {
                name: "WEBHOOK_SECRET",
                description: "Shared secret used to sign webhook deliveries",
                example: "a long random string",
                is_set: config.webhook_secret.is_some(),
            },
        ];

        self.render(
            "github_config.html",
            context! {
                app_name => APP_NAME,
                default_repo_name => config.repo_name,
                variables => variables,
            },
        )
    }

    /// Extracted text plus the sync outcome, if sync ran
    pub fn upload_result(&self, report: &UploadReport) -> Result<String, minijinja::Error> {
        self.render(
            "upload_result.html",
            context! {
                filename => report.content.source_filename,
                text => report.content.text,
                sync => report.sync,
            },
        )
    }

    pub fn alert(&self, level: AlertLevel, message: &str) -> Result<String, minijinja::Error> {
        self.render("alert.html", context! { level => level, message => message })
    }
}

//! Error types shared across the upload pipeline

use serde::Serialize;

use crate::github::GitHubError;
use crate::ocr::{OcrError, PdfError};

/// Coarse classification of every failure the service can report.
///
/// Handlers pick the rendered severity from the kind, and tests assert on
/// it instead of matching message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad or missing upload; reported as a warning
    UserInput,
    /// OCR model or GitHub API failure
    ExternalService,
    /// Missing token, owner, API key or webhook secret
    Configuration,
    /// Anything unexpected inside the service itself
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserInput => "user_input",
            Self::ExternalService => "external_service",
            Self::Configuration => "configuration",
            Self::Internal => "internal",
        }
    }
}

/// Top-level application error
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No file uploaded")]
    NoFile,

    #[error("Could not read upload: {0}")]
    InvalidUpload(String),

    #[error("Unsupported file type '{extension}'. Please upload an image or PDF file.")]
    UnsupportedFileType { extension: String },

    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error(transparent)]
    Pdf(#[from] PdfError),

    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoFile | Self::InvalidUpload(_) | Self::UnsupportedFileType { .. } => ErrorKind::UserInput,
            Self::Ocr(e) => e.kind(),
            Self::Pdf(e) => e.kind(),
            Self::GitHub(e) => e.kind(),
            Self::Config(_) => ErrorKind::Configuration,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<::config::ConfigError> for AppError {
    fn from(e: ::config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<minijinja::Error> for AppError {
    fn from(e: minijinja::Error) -> Self {
        Self::Internal(format!("template error: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

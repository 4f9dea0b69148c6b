//! Upload and extraction records

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Processing path chosen from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Pdf,
    Unsupported,
}

impl FileKind {
    /// Classify a lowercase extension
    pub fn from_extension(extension: &str) -> Self {
        match extension {
            "pdf" => Self::Pdf,
            "jpg" | "jpeg" | "png" | "gif" | "bmp" => Self::Image,
            _ => Self::Unsupported,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Pdf => "pdf",
            Self::Unsupported => "unsupported",
        }
    }
}

/// A file received from the upload form
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    /// Lowercase text after the last `.`, empty when there is none
    pub extension: String,
    pub kind: FileKind,
    pub bytes: Bytes,
}

impl UploadedDocument {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let filename = filename.into();
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();
        let kind = FileKind::from_extension(&extension);

        Self {
            filename,
            extension,
            kind,
            bytes: bytes.into(),
        }
    }
}

/// Text extracted from one upload
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedContent {
    pub source_filename: String,
    pub text: String,
    pub file_kind: FileKind,
    pub extension: String,
    pub created_at: DateTime<Utc>,
}

//! Upload handling: file classification and the processing pipeline

pub mod models;
pub mod orchestrator;

pub use models::{ExtractedContent, FileKind, UploadedDocument};
pub use orchestrator::{UploadOrchestrator, UploadReport};

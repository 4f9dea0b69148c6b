//! Image and PDF text extraction with Gemini OCR and GitHub repository sync
//!
//! An upload is classified by extension, images go straight to the OCR
//! model, PDFs are read page by page with OCR only for pages that have no
//! text layer. Results are kept in a bounded in-memory store and can be
//! committed to a GitHub repository as text files.

pub mod api;
pub mod config;
pub mod error;
pub mod github;
pub mod metrics;
pub mod ocr;
pub mod store;
pub mod upload;
pub mod webhook;

pub use crate::config::Config;
pub use crate::error::{AppError, ErrorKind, Result};

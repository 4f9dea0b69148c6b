//! Text extraction through a hosted vision model
//!
//! - [`client`] - Gemini `generateContent` client implementing [`ImageTextExtractor`]
//! - [`image`] - normalizes uploads to PNG before they are sent
//! - [`pdf`] - per-page text layer extraction with OCR fallback

pub mod client;
pub mod config;
pub mod image;
pub mod models;
pub mod pdf;

pub use client::{GeminiOcrClient, ImageTextExtractor, OcrError};
pub use config::OcrConfig;
pub use pdf::{extract_text_from_pdf, PageSection, PageSource, PdfError, PdfExtraction};

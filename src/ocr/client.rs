//! Gemini OCR client

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::config::OcrConfig;
use super::image::{to_png_base64, OCR_MIME_TYPE};
use super::models::{GenerateContentRequest, GenerateContentResponse};
use crate::error::ErrorKind;
use crate::metrics::METRICS;

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR integration is disabled")]
    Disabled,

    #[error("OCR API key is not configured. Please set GEMINI_API_KEY.")]
    MissingApiKey,

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Upstream error: status {status}: {message}")]
    UpstreamError { status: u16, message: String },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request blocked by the model: {0}")]
    Blocked(String),
}

impl OcrError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Disabled | Self::MissingApiKey => ErrorKind::Configuration,
            Self::InvalidImage(_) => ErrorKind::UserInput,
            _ => ErrorKind::ExternalService,
        }
    }

    /// A body read can time out as well as the send
    fn from_body(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else {
            Self::InvalidResponse(e.to_string())
        }
    }
}

/// Boundary to whatever turns image pixels into text
#[async_trait]
pub trait ImageTextExtractor: Send + Sync {
    /// Extract all text from an encoded image (PNG, JPEG, GIF, BMP, ...)
    async fn extract_text(&self, image: &[u8]) -> Result<String, OcrError>;
}

/// Gemini `generateContent` client
pub struct GeminiOcrClient {
    http: Client,
    config: OcrConfig,
}

impl GeminiOcrClient {
    /// Create a new OCR client
    pub fn new(config: OcrConfig) -> Result<Self, OcrError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| OcrError::RequestFailed(e.to_string()))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    /// Call the Gemini API with an already encoded PNG payload
    async fn call_generate_api(&self, api_key: &str, png_base64: String) -> Result<String, OcrError> {
        let url = self.config.generate_url();
        let body = GenerateContentRequest::with_image(&self.config.prompt, OCR_MIME_TYPE, png_base64);

        debug!("Calling Gemini generateContent: model={}", self.config.model);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OcrError::Timeout(e.to_string())
                } else {
                    OcrError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(OcrError::UpstreamError {
                status: status.as_u16(),
                message: upstream_message(&error_text),
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(OcrError::from_body)?;

        if let Some(reason) = parsed.block_reason() {
            return Err(OcrError::Blocked(reason.to_string()));
        }

        parsed
            .first_text()
            .ok_or_else(|| OcrError::InvalidResponse("response contained no candidates".to_string()))
    }
}

#[async_trait]
impl ImageTextExtractor for GeminiOcrClient {
    async fn extract_text(&self, image: &[u8]) -> Result<String, OcrError> {
        let start = Instant::now();

        if !self.config.enabled {
            METRICS.record_ocr("disabled", start.elapsed());
            return Err(OcrError::Disabled);
        }

        let api_key = match &self.config.api_key {
            Some(key) => key.expose_secret().clone(),
            None => {
                METRICS.record_ocr("unconfigured", start.elapsed());
                return Err(OcrError::MissingApiKey);
            }
        };

        // Decoding and re-encoding is CPU bound
        let bytes = image.to_vec();
        let png_base64 = tokio::task::spawn_blocking(move || to_png_base64(&bytes))
            .await
            .map_err(|e| OcrError::InvalidImage(format!("image worker failed: {}", e)))??;

        match self.call_generate_api(&api_key, png_base64).await {
            Ok(text) => {
                METRICS.record_ocr("success", start.elapsed());
                info!("OCR completed: {} chars in {:?}", text.len(), start.elapsed());
                Ok(text)
            }
            Err(e) => {
                METRICS.record_ocr("error", start.elapsed());
                match &e {
                    OcrError::Timeout(_) => warn!("OCR request timed out after {:?}", start.elapsed()),
                    _ => error!("OCR request failed: {}", e),
                }
                Err(e)
            }
        }
    }
}

/// Pull the human readable message out of a Google API error body
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

//! Configuration for the Gemini OCR integration

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

/// OCR client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    /// Enable/disable OCR integration globally
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Base URL of the Generative Language API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API key (read from env GEMINI_API_KEY if not set)
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Model used for extraction
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Instruction sent alongside every image
    #[serde(default = "default_prompt")]
    pub prompt: String,
}

fn default_enabled() -> bool { true }
fn default_api_url() -> String { "https://generativelanguage.googleapis.com/v1beta".to_string() }
fn default_model() -> String { "gemini-1.5-flash".to_string() }
fn default_timeout_ms() -> u64 { 30_000 }
fn default_prompt() -> String {
    "Extract all text from this image. Return only the text content, no additional formatting or explanations.".to_string()
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            api_url: default_api_url(),
            api_key: None,
            model: default_model(),
            timeout_ms: default_timeout_ms(),
            prompt: default_prompt(),
        }
    }
}

impl OcrConfig {
    /// Load configuration from environment variables
    pub fn from_env(mut self) -> Self {
        if let Ok(val) = std::env::var("OCR_ENABLED") {
            self.enabled = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("GEMINI_API_URL") {
            self.api_url = val;
        }

        let key = std::env::var("GEMINI_API_KEY").or_else(|_| std::env::var("GOOGLE_API_KEY"));
        if let Ok(val) = key {
            if !val.trim().is_empty() {
                self.api_key = Some(SecretString::new(val));
            }
        }

        if let Ok(val) = std::env::var("GEMINI_MODEL") {
            self.model = val;
        }

        if let Ok(val) = std::env::var("OCR_TIMEOUT_MS") {
            if let Ok(timeout) = val.parse() {
                self.timeout_ms = timeout;
            }
        }

        self
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Full URL of the `generateContent` endpoint for the configured model
    pub fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model
        )
    }
}

//! Application configuration
//!
//! Values come from an optional TOML file (`CONFIG_PATH`, default
//! `config.toml`), then environment variables override each section.

use serde::Deserialize;
use std::net::SocketAddr;

use crate::error::{AppError, Result};
use crate::github::GitHubConfig;
use crate::ocr::OcrConfig;
use crate::store::StoreConfig;

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 5000 }
fn default_max_upload_bytes() -> usize { 20 * 1024 * 1024 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl ServerConfig {
    pub fn from_env(mut self) -> Self {
        if let Ok(val) = std::env::var("HOST") {
            self.host = val;
        }

        if let Ok(val) = std::env::var("PORT") {
            if let Ok(port) = val.parse() {
                self.port = port;
            }
        }

        if let Ok(val) = std::env::var("MAX_UPLOAD_BYTES") {
            if let Ok(bytes) = val.parse() {
                self.max_upload_bytes = bytes;
            }
        }

        self
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid listen address {}:{}: {}", self.host, self.port, e)))
    }
}

/// Logging settings
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human readable output
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String { "info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

impl LoggingConfig {
    pub fn from_env(mut self) -> Self {
        if let Ok(val) = std::env::var("LOG_LEVEL") {
            self.level = val;
        }

        if let Ok(val) = std::env::var("LOG_FORMAT") {
            self.json = val.eq_ignore_ascii_case("json");
        }

        self
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub ocr: OcrConfig,

    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

impl Config {
    /// Read a TOML file; a missing file yields the defaults
    pub fn from_file(path: &str) -> Result<Self> {
        let config = ::config::Config::builder()
            .add_source(::config::File::with_name(path).required(false))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Apply environment overrides to every section
    pub fn from_env(self) -> Self {
        Self {
            server: self.server.from_env(),
            logging: self.logging.from_env(),
            ocr: self.ocr.from_env(),
            github: self.github.from_env(),
            store: self.store.from_env(),
        }
    }

    /// File (if any) then environment
    pub fn load() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        Ok(Self::from_file(&path)?.from_env())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.max_upload_bytes, 20 * 1024 * 1024);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.ocr.model, "gemini-1.5-flash");
        assert_eq!(config.store.max_entries, 500);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::from_file("/nonexistent/ocr-sync-config").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.github.repo_name, "busyness-chatbot");
    }

    #[test]
    fn test_partial_file() {
        let path = std::env::temp_dir().join(format!("ocr-sync-{}.toml", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[server]\nport = 8080\n\n[github]\nrepo_name = \"scans\"\ncontent_dir = \"ocr\"").unwrap();

        let config = Config::from_file(path.to_str().unwrap()).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.github.repo_name, "scans");
        assert_eq!(config.github.content_dir, "ocr");
        assert_eq!(config.github.branch, "main");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_socket_addr() {
        let server = ServerConfig::default();
        assert_eq!(server.socket_addr().unwrap().port(), 5000);

        let server = ServerConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(server.socket_addr().is_err());
    }
}

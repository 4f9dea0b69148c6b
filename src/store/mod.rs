//! Bounded in-memory store of recent extractions

use chrono::{DateTime, Utc};
use moka::future::Cache;
use moka::policy::EvictionPolicy;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::upload::ExtractedContent;

/// Store capacity and expiry
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,

    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_max_entries() -> u64 {
    500
}

fn default_ttl_secs() -> u64 {
    24 * 60 * 60
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl StoreConfig {
    pub fn from_env(mut self) -> Self {
        if let Ok(val) = std::env::var("STORE_MAX_ENTRIES") {
            if let Ok(n) = val.parse() {
                self.max_entries = n;
            }
        }

        if let Ok(val) = std::env::var("STORE_TTL_SECS") {
            if let Ok(n) = val.parse() {
                self.ttl_secs = n;
            }
        }

        self
    }
}

/// Listing entry for `GET /extractions`
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoredExtraction {
    pub id: String,
    pub content: Arc<ExtractedContent>,
}

/// Cache statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoreStats {
    pub entries: u64,
    pub max_entries: u64,
    pub ttl_secs: u64,
}

/// Extractions keyed by `{filename}_{YYYYMMDD_HHMMSS}`; last write wins
#[derive(Clone)]
pub struct ContentStore {
    cache: Cache<String, Arc<ExtractedContent>>,
    config: StoreConfig,
}

impl ContentStore {
    pub fn new(config: StoreConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            // Keys are written once and rarely read; admit every new one
            .eviction_policy(EvictionPolicy::lru())
            .time_to_live(Duration::from_secs(config.ttl_secs))
            .build();

        Self { cache, config }
    }

    pub fn key_for(filename: &str, at: DateTime<Utc>) -> String {
        format!("{}_{}", filename, at.format("%Y%m%d_%H%M%S"))
    }

    /// Store an extraction, returning its key and the shared record
    pub async fn insert(&self, content: ExtractedContent) -> (String, Arc<ExtractedContent>) {
        let key = Self::key_for(&content.source_filename, content.created_at);
        debug!("Storing extraction {}", key);
        let content = Arc::new(content);
        self.cache.insert(key.clone(), content.clone()).await;
        (key, content)
    }

    pub async fn get(&self, key: &str) -> Option<Arc<ExtractedContent>> {
        self.cache.get(key).await
    }

    /// Most recent extractions first
    pub async fn recent(&self, limit: usize) -> Vec<StoredExtraction> {
        self.cache.run_pending_tasks().await;

        let mut entries: Vec<StoredExtraction> = self
            .cache
            .iter()
            .map(|(key, content)| StoredExtraction {
                id: key.as_ref().clone(),
                content,
            })
            .collect();

        entries.sort_by(|a, b| {
            b.content
                .created_at
                .cmp(&a.content.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        entries.truncate(limit);
        entries
    }

    pub async fn len(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    pub async fn stats(&self) -> StoreStats {
        StoreStats {
            entries: self.len().await,
            max_entries: self.config.max_entries,
            ttl_secs: self.config.ttl_secs,
        }
    }
}

//! Runtime configuration, loaded from the environment.

use crate::cache::CacheConfig;
use anyhow::Context;
use figment::Figment;
use figment::providers::Env;
use serde::Deserialize;
use std::time::Duration;

fn default_page_size() -> u32 {
    24
}

fn default_request_timeout_secs() -> u64 {
    12
}

fn default_cache_ttl_secs() -> u64 {
    60
}

fn default_cache_capacity() -> usize {
    10
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_eager_count() -> usize {
    crate::grid::DEFAULT_EAGER_COUNT
}

/// Configuration for a search session.
///
/// Loaded from `WALLSEARCH_*` environment variables via [`SearchConfig::from_env`];
/// everything except the endpoint has a sensible default.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Search RPC endpoint URL.
    pub endpoint: String,
    /// Bearer token attached to search requests, if the endpoint requires one.
    #[serde(default)]
    pub bearer_token: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_eager_count")]
    pub eager_count: usize,
}

impl SearchConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Figment::new()
            .merge(Env::prefixed("WALLSEARCH_"))
            .extract()
            .context("Failed to load search config")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl: Duration::from_secs(self.cache_ttl_secs),
            capacity: self.cache_capacity,
        }
    }
}

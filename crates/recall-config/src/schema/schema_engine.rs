//! Engine and cache configuration types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use recall_protocols::FailurePolicy;

/// `[engine]`: retrieval behaviour fixed at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Deadline per single-source search in milliseconds; 0 disables it.
    #[serde(default = "default_search_timeout_ms")]
    pub search_timeout_ms: u64,

    #[serde(default = "default_message_window")]
    pub message_window: usize,

    #[serde(default = "default_episodic_window")]
    pub episodic_window: usize,

    #[serde(default = "default_importance_weight")]
    pub importance_weight: f32,

    #[serde(default = "default_embed_concurrency")]
    pub embed_concurrency: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::default(),
            search_timeout_ms: default_search_timeout_ms(),
            message_window: default_message_window(),
            episodic_window: default_episodic_window(),
            importance_weight: default_importance_weight(),
            embed_concurrency: default_embed_concurrency(),
        }
    }
}

impl EngineConfig {
    pub fn search_timeout(&self) -> Option<Duration> {
        millis(self.search_timeout_ms)
    }
}

fn default_search_timeout_ms() -> u64 {
    10_000
}

fn default_message_window() -> usize {
    200
}

fn default_episodic_window() -> usize {
    100
}

fn default_importance_weight() -> f32 {
    0.2
}

fn default_embed_concurrency() -> usize {
    8
}

/// `[cache]`: embedding cache tiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Local tier bound (FIFO eviction).
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Deadline per provider call in milliseconds; 0 disables it.
    #[serde(default = "default_provider_timeout_ms")]
    pub provider_timeout_ms: u64,

    #[serde(default)]
    pub shared: SharedCacheConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            provider_timeout_ms: default_provider_timeout_ms(),
            shared: SharedCacheConfig::default(),
        }
    }
}

impl CacheConfig {
    pub fn provider_timeout(&self) -> Option<Duration> {
        millis(self.provider_timeout_ms)
    }
}

fn default_capacity() -> usize {
    1000
}

fn default_provider_timeout_ms() -> u64 {
    5_000
}

/// `[cache.shared]`: optional cross-process tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedCacheConfig {
    /// Redis URL; absent means local-only caching.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    #[serde(default = "crate::schema::default_true")]
    pub write_behind: bool,
}

impl Default for SharedCacheConfig {
    fn default() -> Self {
        Self {
            url: None,
            key_prefix: default_key_prefix(),
            write_behind: true,
        }
    }
}

fn default_key_prefix() -> String {
    "embedding".to_string()
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

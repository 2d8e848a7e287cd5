//! Per-call search configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Options recognised by every single-source search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of results to return.
    pub top_k: usize,

    /// Inclusive lower bound a score must reach to be kept.
    pub min_score: f32,

    /// Whether the embedding cache is consulted at all.
    pub use_cache: bool,

    /// Seconds a cache entry stays fresh.
    pub cache_ttl_secs: u64,

    /// Candidate recency window in days.
    pub max_age_days: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            min_score: 0.5,
            use_cache: true,
            cache_ttl_secs: 3600,
            max_age_days: 365,
        }
    }
}

impl SearchConfig {
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_secs = ttl.as_secs();
        self
    }

    pub fn with_max_age_days(mut self, days: u32) -> Self {
        self.max_age_days = days;
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Options for a hybrid (messages + episodic) search.
///
/// Weights are independent multipliers and need not sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridConfig {
    #[serde(flatten)]
    pub search: SearchConfig,

    pub message_weight: f32,

    pub episodic_weight: f32,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            message_weight: 0.6,
            episodic_weight: 0.4,
        }
    }
}

impl HybridConfig {
    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    pub fn with_weights(mut self, message_weight: f32, episodic_weight: f32) -> Self {
        self.message_weight = message_weight;
        self.episodic_weight = episodic_weight;
        self
    }
}

/// How a failed single-source search is surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log the failure and return an empty result list.
    #[default]
    RecoverableEmpty,
    /// Return the error to the caller.
    Propagate,
}

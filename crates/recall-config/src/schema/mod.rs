//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

use recall_protocols::{HybridConfig, SearchConfig};

mod schema_engine;
mod schema_provider;

pub use schema_engine::*;
pub use schema_provider::*;

/// Shared default helper used by submodules.
pub(crate) fn default_true() -> bool {
    true
}

/// Root configuration. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    /// Defaults for every search call.
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub hybrid: HybridWeights,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Hybrid search options: the `[search]` defaults plus `[hybrid]` weights.
    pub fn hybrid_config(&self) -> HybridConfig {
        HybridConfig::default()
            .with_search(self.search.clone())
            .with_weights(self.hybrid.message_weight, self.hybrid.episodic_weight)
    }
}

/// Per-source multipliers applied by hybrid search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HybridWeights {
    #[serde(default = "default_message_weight")]
    pub message_weight: f32,

    #[serde(default = "default_episodic_weight")]
    pub episodic_weight: f32,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            message_weight: default_message_weight(),
            episodic_weight: default_episodic_weight(),
        }
    }
}

fn default_message_weight() -> f32 {
    0.6
}

fn default_episodic_weight() -> f32 {
    0.4
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;

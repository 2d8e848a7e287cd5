//! Vector retrieval primitives for Recall.
//!
//! - [`similarity`]: exact cosine scoring, single pair and batch
//! - [`EmbeddingCache`]: two-tier (local + shared) embedding cache
//! - [`SourceSearcher`]: one retrieval pass over a bounded candidate window
//! - In-memory candidate sources and shared cache for tests and small deployments

mod cache;
mod embedding;
mod searcher;
mod shared;
pub mod similarity;
mod source;

pub use cache::{cache_key, CacheStats, EmbeddingCache, EmbeddingCacheConfig};
pub use embedding::SimpleHashEmbedding;
pub use searcher::{
    importance_boost, select_top_k, CandidateWindow, EpisodicWindow, MessageWindow,
    SourceSearcher,
};
pub use shared::InMemorySharedCache;
pub use similarity::{batch_cosine_similarity, cosine_similarity};
pub use source::{InMemoryEpisodicSource, InMemoryMessageSource};

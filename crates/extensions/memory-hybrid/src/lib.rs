//! Hybrid retrieval for Recall.
//!
//! Runs the message and episodic single-source searches concurrently,
//! weights each source's scores and merges them into one ranking.
//!
//! ## Features
//!
//! - **Retrieval engine**: the facade applications call (`search_messages`,
//!   `search_episodic_memories`, `hybrid_search`, cache administration)
//! - **Failure policy**: degraded searches return empty lists or errors
//! - **Real embeddings**: OpenAI-compatible `/embeddings` provider
//! - **Redis**: shared embedding cache tier (feature `redis`)

mod embedding;
mod engine;
mod ranker;
#[cfg(feature = "redis")]
mod redis_cache;

pub use embedding::{OpenAIEmbedding, OpenAIEmbeddingConfig};
pub use engine::{EngineOptions, RetrievalEngine, RetrievalEngineBuilder};
pub use ranker::weighted_merge;
#[cfg(feature = "redis")]
pub use redis_cache::RedisSharedCache;

//! # Recall Protocols
//!
//! Core protocol definitions for the Recall retrieval engine.
//! Contains only types and interface definitions - no implementations.
//!
//! ## Core Traits
//!
//! - [`EmbeddingProvider`] - Maps text to a fixed-dimension vector
//! - [`SharedCache`] - Optional shared (cross-process) embedding cache tier
//! - [`MessageSource`] - Fetches recent user messages as search candidates
//! - [`EpisodicSource`] - Fetches episodic memories as search candidates

pub mod cache;
pub mod embedding;
pub mod error;
pub mod search;
pub mod source;
pub mod types;

// Re-export core traits
pub use cache::SharedCache;
pub use embedding::EmbeddingProvider;
pub use search::{FailurePolicy, HybridConfig, SearchConfig};
pub use source::{EpisodicSource, MessageSource};
pub use error::{CacheError, EmbeddingError, SearchError, SimilarityError, SourceError};
pub use types::*;

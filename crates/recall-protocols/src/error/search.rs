//! Search and similarity errors.

use std::time::Duration;

use thiserror::Error;

use super::{EmbeddingError, SourceError};

/// Error from the pure similarity functions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimilarityError {
    #[error("Vector dimensions don't match: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
}

/// Error from a single-source or hybrid search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Embedding provider error: {0}")]
    Provider(EmbeddingError),

    #[error("Query vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Candidate fetch failed: {0}")]
    SourceFetch(#[from] SourceError),

    #[error("Search timed out after {0:?}")]
    Timeout(Duration),
}

impl From<EmbeddingError> for SearchError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::DimensionMismatch { expected, actual } => {
                Self::DimensionMismatch { expected, actual }
            }
            other => Self::Provider(other),
        }
    }
}

impl From<SimilarityError> for SearchError {
    fn from(err: SimilarityError) -> Self {
        match err {
            SimilarityError::DimensionMismatch { left, right } => Self::DimensionMismatch {
                expected: left,
                actual: right,
            },
        }
    }
}

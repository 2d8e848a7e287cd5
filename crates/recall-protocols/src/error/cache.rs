//! Shared cache tier errors.
//!
//! These never escape the embedding cache: any shared-tier failure is
//! logged and treated as a miss.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Shared cache unavailable: {0}")]
    Unavailable(String),

    #[error("Cache serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

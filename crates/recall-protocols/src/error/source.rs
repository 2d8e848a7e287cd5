//! Candidate source errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Source connection error: {0}")]
    Connection(String),

    #[error("Source query error: {0}")]
    Query(String),
}

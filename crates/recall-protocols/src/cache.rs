//! Shared cache tier protocol.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::CacheError;

/// A cross-process key/value cache (e.g. Redis).
///
/// Consistency is owned by the service behind this trait. The engine treats
/// it as eventually consistent and relies on it only for latency; every error
/// is caught and handled as a miss.
#[async_trait]
pub trait SharedCache: Send + Sync {
    /// Read a value, `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Write a value that expires after `ttl`.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;
}

//! In-memory shared cache tier.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::time::Instant;

use recall_protocols::{CacheError, SharedCache};

/// Shared tier backed by a process map with per-entry TTL.
///
/// Share one instance (behind an `Arc`) between several engines to emulate a
/// cross-process cache. Availability can be toggled to exercise the
/// degrade-to-local path.
pub struct InMemorySharedCache {
    /// Value and expiry; `None` never expires.
    entries: RwLock<HashMap<String, (Vec<u8>, Option<Instant>)>>,
    available: AtomicBool,
}

impl InMemorySharedCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate an outage (`false`) or recovery (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn check_available(&self) -> Result<(), CacheError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CacheError::Unavailable("shared cache offline".to_string()))
        }
    }
}

impl Default for InMemorySharedCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SharedCache for InMemorySharedCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.check_available()?;
        let entries = self.entries.read();
        Ok(entries
            .get(key)
            .filter(|(_, expires)| expires.is_none_or(|at| Instant::now() < at))
            .map(|(value, _)| value.clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        self.check_available()?;
        self.entries
            .write()
            .insert(key.to_string(), (value, Instant::now().checked_add(ttl)));
        Ok(())
    }
}

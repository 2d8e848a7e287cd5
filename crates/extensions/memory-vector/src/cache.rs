//! Two-tier embedding cache.
//!
//! Lookup order is local tier, then shared tier, then the embedding
//! provider. Results are written through to both tiers. The local tier is
//! bounded and evicts in insertion order (FIFO, not LRU); entries expire
//! lazily on read once older than the caller's TTL.
//!
//! Keys are a truncated BLAKE3 digest of the trimmed text. A collision would
//! only yield a wrong cache hit for pathological inputs; this is an accepted
//! approximation, not a correctness guarantee.
//!
//! Concurrent misses for the same key are not coalesced: both callers reach
//! the provider and the later write wins.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::json;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, warn};

use recall_protocols::{
    CacheError, EmbeddingError, EmbeddingProvider, EmbeddingVector, SearchConfig, SharedCache,
};

/// Hex characters kept from the digest (128 bits).
const KEY_HEX_LEN: usize = 32;

/// Deterministic cache key for a text.
pub fn cache_key(text: &str) -> String {
    let digest = blake3::hash(text.trim().as_bytes()).to_hex();
    digest[..KEY_HEX_LEN].to_string()
}

/// Construction-time cache settings.
#[derive(Debug, Clone)]
pub struct EmbeddingCacheConfig {
    /// Maximum number of local-tier entries.
    pub capacity: usize,
    /// Deadline for a single provider call; `None` waits indefinitely.
    pub provider_timeout: Option<Duration>,
    /// Namespace prepended to shared-tier keys.
    pub key_prefix: String,
    /// Spawn shared-tier writes instead of awaiting them.
    pub write_behind: bool,
}

impl Default for EmbeddingCacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            provider_timeout: Some(Duration::from_secs(5)),
            key_prefix: "embedding".to_string(),
            write_behind: true,
        }
    }
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub hits: u64,
    pub shared_hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of cached lookups served without calling the provider.
    pub fn hit_rate(&self) -> f64 {
        let served = self.hits + self.shared_hits;
        let total = served + self.misses;
        if total == 0 {
            0.0
        } else {
            served as f64 / total as f64
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "size": self.size,
            "max_size": self.max_size,
            "hits": self.hits,
            "shared_hits": self.shared_hits,
            "misses": self.misses,
            "hit_rate": self.hit_rate(),
        })
    }
}

struct CacheEntry {
    vector: EmbeddingVector,
    created: Instant,
}

#[derive(Default)]
struct LocalEntries {
    entries: HashMap<String, CacheEntry>,
    order: VecDeque<String>,
}

/// Bounded process-local tier guarded by a single mutex.
struct LocalTier {
    capacity: usize,
    inner: Mutex<LocalEntries>,
}

impl LocalTier {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(LocalEntries::default()),
        }
    }

    fn get(&self, key: &str, ttl: Duration) -> Option<EmbeddingVector> {
        let inner = self.inner.lock();
        inner
            .entries
            .get(key)
            .filter(|entry| entry.created.elapsed() < ttl)
            .map(|entry| entry.vector.clone())
    }

    fn insert(&self, key: String, vector: EmbeddingVector) {
        if self.capacity == 0 {
            return;
        }

        let mut inner = self.inner.lock();
        let now = Instant::now();

        // Refresh in place; the key keeps its insertion position.
        if let Some(entry) = inner.entries.get_mut(&key) {
            entry.vector = vector;
            entry.created = now;
            return;
        }

        while inner.entries.len() >= self.capacity {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.entries.remove(&oldest);
            debug!(key = %oldest, "Evicted oldest embedding cache entry");
        }

        inner.order.push_back(key.clone());
        inner.entries.insert(
            key,
            CacheEntry {
                vector,
                created: now,
            },
        );
    }

    fn contains(&self, key: &str) -> bool {
        self.inner.lock().entries.contains_key(key)
    }

    fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
    }
}

/// Embedding cache owned by one engine instance.
pub struct EmbeddingCache {
    provider: Arc<dyn EmbeddingProvider>,
    shared: Option<Arc<dyn SharedCache>>,
    local: LocalTier,
    config: EmbeddingCacheConfig,
    hits: AtomicU64,
    shared_hits: AtomicU64,
    misses: AtomicU64,
    /// Write-behind shared-tier writes not yet joined. Aborted on drop.
    pending_writes: Mutex<JoinSet<()>>,
}

impl EmbeddingCache {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, config: EmbeddingCacheConfig) -> Self {
        Self {
            provider,
            shared: None,
            local: LocalTier::new(config.capacity),
            config,
            hits: AtomicU64::new(0),
            shared_hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            pending_writes: Mutex::new(JoinSet::new()),
        }
    }

    /// Attach a shared tier.
    pub fn with_shared(mut self, shared: Arc<dyn SharedCache>) -> Self {
        self.shared = Some(shared);
        self
    }

    /// Dimension of every vector this cache returns.
    pub fn dimension(&self) -> usize {
        self.provider.dimension()
    }

    /// Return the embedding for `text`, computing and storing it on a miss.
    ///
    /// Shared-tier failures degrade to a miss. Provider failures, timeouts
    /// and wrong-dimension provider output are returned as errors.
    pub async fn resolve(
        &self,
        text: &str,
        config: &SearchConfig,
    ) -> Result<EmbeddingVector, EmbeddingError> {
        if !config.use_cache {
            return self.compute(text).await;
        }

        let key = cache_key(text);
        let ttl = config.cache_ttl();

        if let Some(vector) = self.local.get(&key, ttl) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Embedding cache hit (local)");
            return Ok(vector);
        }

        if let Some(vector) = self.read_shared(&key).await {
            self.shared_hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Embedding cache hit (shared)");
            self.local.insert(key, vector.clone());
            return Ok(vector);
        }

        let vector = self.compute(text).await?;
        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, "Embedding cache miss");

        self.local.insert(key.clone(), vector.clone());
        self.write_shared(&key, &vector, ttl).await;

        Ok(vector)
    }

    /// Whether the local tier holds an entry (fresh or not) for `text`.
    pub fn contains(&self, text: &str) -> bool {
        self.local.contains(&cache_key(text))
    }

    /// Wait for every write-behind shared-tier write spawned so far.
    ///
    /// Short-lived processes call this before exiting so the shared tier
    /// keeps what they computed.
    pub async fn flush_shared_writes(&self) {
        let mut pending = std::mem::take(&mut *self.pending_writes.lock());
        let count = pending.len();
        while pending.join_next().await.is_some() {}
        if count > 0 {
            debug!(count, "Flushed shared cache writes");
        }
    }

    /// Drop every local-tier entry. Counters are kept.
    pub fn clear(&self) {
        self.local.clear();
        debug!("Embedding cache cleared");
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.local.len(),
            max_size: self.config.capacity,
            hits: self.hits.load(Ordering::Relaxed),
            shared_hits: self.shared_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    async fn compute(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        let vector = match self.config.provider_timeout {
            Some(limit) => tokio::time::timeout(limit, self.provider.embed(text))
                .await
                .map_err(|_| EmbeddingError::Timeout(limit))??,
            None => self.provider.embed(text).await?,
        };

        let expected = self.provider.dimension();
        if vector.len() != expected {
            return Err(EmbeddingError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }

        Ok(vector)
    }

    fn shared_key(&self, key: &str) -> String {
        format!("{}:{}", self.config.key_prefix, key)
    }

    async fn read_shared(&self, key: &str) -> Option<EmbeddingVector> {
        let shared = self.shared.as_ref()?;
        let shared_key = self.shared_key(key);

        let bytes = match shared.get(&shared_key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %shared_key, error = %e, "Shared cache read failed, using local tier only");
                return None;
            }
        };

        match decode_vector(&bytes) {
            Ok(vector) if vector.len() == self.provider.dimension() => Some(vector),
            Ok(vector) => {
                warn!(
                    key = %shared_key,
                    expected = self.provider.dimension(),
                    actual = vector.len(),
                    "Ignoring shared cache entry with wrong dimension"
                );
                None
            }
            Err(e) => {
                warn!(key = %shared_key, error = %e, "Ignoring undecodable shared cache entry");
                None
            }
        }
    }

    async fn write_shared(&self, key: &str, vector: &EmbeddingVector, ttl: Duration) {
        let Some(shared) = self.shared.clone() else {
            return;
        };

        let payload = match serde_json::to_vec(vector) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Failed to encode embedding for shared cache");
                return;
            }
        };
        let shared_key = self.shared_key(key);

        if self.config.write_behind {
            let mut pending = self.pending_writes.lock();
            while pending.try_join_next().is_some() {}
            pending.spawn(async move {
                if let Err(e) = shared.set(&shared_key, payload, ttl).await {
                    warn!(key = %shared_key, error = %e, "Shared cache write failed");
                }
            });
        } else if let Err(e) = shared.set(&shared_key, payload, ttl).await {
            warn!(key = %shared_key, error = %e, "Shared cache write failed");
        }
    }
}

fn decode_vector(bytes: &[u8]) -> Result<EmbeddingVector, CacheError> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;

//! Builds engine collaborators from configuration.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use recall_config::{Config, ConfigError, EmbeddingConfig, EmbeddingProviderKind, SharedCacheConfig};
use recall_memory_hybrid::{EngineOptions, OpenAIEmbedding, OpenAIEmbeddingConfig, RetrievalEngine};
use recall_memory_sqlite::SqliteStore;
use recall_memory_vector::{EmbeddingCacheConfig, SimpleHashEmbedding};
use recall_protocols::{EmbeddingProvider, SharedCache};

/// Get the .recall directory path.
pub(crate) fn recall_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".recall"))
        .unwrap_or_else(|| PathBuf::from(".recall"))
}

pub(crate) fn build_provider(
    config: &EmbeddingConfig,
) -> Result<Arc<dyn EmbeddingProvider>, ConfigError> {
    match config.provider {
        EmbeddingProviderKind::Hash => Ok(Arc::new(SimpleHashEmbedding::new(config.dimension))),
        EmbeddingProviderKind::OpenAI => {
            let openai = OpenAIEmbeddingConfig::new(config.require_api_key()?)
                .with_model(&config.model)
                .with_base_url(&config.base_url)
                .with_dimension(config.dimension);
            Ok(Arc::new(OpenAIEmbedding::new(openai)))
        }
    }
}

/// Connect the shared tier. Connection failures fall back to local-only
/// caching.
#[cfg(feature = "redis")]
pub(crate) async fn build_shared_cache(config: &SharedCacheConfig) -> Option<Arc<dyn SharedCache>> {
    let url = config.url.as_deref()?;
    match recall_memory_hybrid::RedisSharedCache::connect(url).await {
        Ok(cache) => Some(Arc::new(cache)),
        Err(e) => {
            warn!(error = %e, "Shared cache unavailable, using local cache only");
            None
        }
    }
}

#[cfg(not(feature = "redis"))]
pub(crate) async fn build_shared_cache(config: &SharedCacheConfig) -> Option<Arc<dyn SharedCache>> {
    if config.url.is_some() {
        warn!("cache.shared.url is set but recall was built without the `redis` feature");
    }
    None
}

pub(crate) fn engine_options(config: &Config) -> EngineOptions {
    EngineOptions {
        failure_policy: config.engine.failure_policy,
        search_timeout: config.engine.search_timeout(),
        message_window: config.engine.message_window,
        episodic_window: config.engine.episodic_window,
        importance_weight: config.engine.importance_weight,
        embed_concurrency: config.engine.embed_concurrency,
    }
}

pub(crate) fn cache_config(config: &Config) -> EmbeddingCacheConfig {
    EmbeddingCacheConfig {
        capacity: config.cache.capacity,
        provider_timeout: config.cache.provider_timeout(),
        key_prefix: config.cache.shared.key_prefix.clone(),
        write_behind: config.cache.shared.write_behind,
    }
}

/// Open the store named by `[storage] path`, creating parent directories.
pub(crate) async fn open_store(config: &Config) -> Result<Arc<SqliteStore>, Box<dyn std::error::Error>> {
    let path = config.storage.resolved_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(Arc::new(SqliteStore::open(&path).await?))
}

pub(crate) async fn build_engine(
    config: &Config,
    store: Arc<SqliteStore>,
) -> Result<RetrievalEngine, ConfigError> {
    let provider = build_provider(&config.embedding)?;
    let mut builder = RetrievalEngine::builder(provider, store.clone(), store)
        .with_options(engine_options(config))
        .with_cache_config(cache_config(config));

    if let Some(shared) = build_shared_cache(&config.cache.shared).await {
        builder = builder.with_shared_cache(shared);
    }

    info!(provider = ?config.embedding.provider, "Building retrieval engine");
    Ok(builder.build())
}

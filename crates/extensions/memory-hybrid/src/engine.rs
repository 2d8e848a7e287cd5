//! Retrieval engine facade.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{info, warn};

use recall_memory_vector::{
    CacheStats, CandidateWindow, EmbeddingCache, EmbeddingCacheConfig, EpisodicWindow,
    MessageWindow, SourceSearcher,
};
use recall_protocols::{
    EmbeddingProvider, EpisodicSource, FailurePolicy, HybridConfig, MessageSource, ResultSource,
    SearchConfig, SearchError, SearchResult, SharedCache,
};

use crate::ranker::weighted_merge;

/// Engine-wide settings fixed at construction.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub failure_policy: FailurePolicy,
    /// Deadline for one single-source search; `None` waits indefinitely.
    pub search_timeout: Option<Duration>,
    /// Candidate cap for the message window.
    pub message_window: usize,
    /// Candidate cap for the episodic window.
    pub episodic_window: usize,
    /// Share of an episodic memory's importance added to its similarity.
    pub importance_weight: f32,
    /// Candidate embeddings resolved concurrently within one search.
    pub embed_concurrency: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::default(),
            search_timeout: Some(Duration::from_secs(10)),
            message_window: 200,
            episodic_window: 100,
            importance_weight: 0.2,
            embed_concurrency: 8,
        }
    }
}

/// Builder for [`RetrievalEngine`].
pub struct RetrievalEngineBuilder {
    provider: Arc<dyn EmbeddingProvider>,
    messages: Arc<dyn MessageSource>,
    episodic: Arc<dyn EpisodicSource>,
    options: EngineOptions,
    cache_config: EmbeddingCacheConfig,
    shared: Option<Arc<dyn SharedCache>>,
}

impl RetrievalEngineBuilder {
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_cache_config(mut self, config: EmbeddingCacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Attach a shared embedding cache tier.
    pub fn with_shared_cache(mut self, shared: Arc<dyn SharedCache>) -> Self {
        self.shared = Some(shared);
        self
    }

    pub fn build(self) -> RetrievalEngine {
        let shared_tier = self.shared.is_some();
        let mut cache = EmbeddingCache::new(self.provider, self.cache_config);
        if let Some(shared) = self.shared {
            cache = cache.with_shared(shared);
        }

        let searcher = SourceSearcher::new(Arc::new(cache))
            .with_embed_concurrency(self.options.embed_concurrency);

        info!(
            dimension = searcher.cache().dimension(),
            shared_tier,
            policy = ?self.options.failure_policy,
            "Retrieval engine ready"
        );

        RetrievalEngine {
            searcher,
            messages: self.messages,
            episodic: self.episodic,
            options: self.options,
            failed_searches: AtomicU64::new(0),
        }
    }
}

/// Semantic search over an agent's messages and episodic memories.
///
/// One instance serves concurrent callers; the embedding cache is shared
/// by every search it runs.
pub struct RetrievalEngine {
    searcher: SourceSearcher,
    messages: Arc<dyn MessageSource>,
    episodic: Arc<dyn EpisodicSource>,
    options: EngineOptions,
    failed_searches: AtomicU64,
}

impl RetrievalEngine {
    pub fn builder(
        provider: Arc<dyn EmbeddingProvider>,
        messages: Arc<dyn MessageSource>,
        episodic: Arc<dyn EpisodicSource>,
    ) -> RetrievalEngineBuilder {
        RetrievalEngineBuilder {
            provider,
            messages,
            episodic,
            options: EngineOptions::default(),
            cache_config: EmbeddingCacheConfig::default(),
            shared: None,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Rank the user's recent messages against `query`.
    pub async fn search_messages(
        &self,
        agent_id: &str,
        user_id: &str,
        query: &str,
        config: &SearchConfig,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let window = MessageWindow {
            source: self.messages.as_ref(),
            agent_id,
            user_id,
            limit: self.options.message_window,
        };
        let outcome = self.run(query, &window, config).await;
        self.settle(ResultSource::Message, outcome)
    }

    /// Rank the agent's episodic memories against `query`, boosted by
    /// importance.
    pub async fn search_episodic_memories(
        &self,
        agent_id: &str,
        query: &str,
        config: &SearchConfig,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let window = EpisodicWindow {
            source: self.episodic.as_ref(),
            agent_id,
            limit: self.options.episodic_window,
            importance_weight: self.options.importance_weight,
        };
        let outcome = self.run(query, &window, config).await;
        self.settle(ResultSource::Episodic, outcome)
    }

    /// Search both sources concurrently and merge by weighted score.
    ///
    /// Under [`FailurePolicy::RecoverableEmpty`] a failed source contributes
    /// nothing. Under [`FailurePolicy::Propagate`] the first failure, in
    /// message then episodic order, is returned.
    pub async fn hybrid_search(
        &self,
        agent_id: &str,
        user_id: &str,
        query: &str,
        config: &HybridConfig,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let (messages, episodic) = tokio::join!(
            self.search_messages(agent_id, user_id, query, &config.search),
            self.search_episodic_memories(agent_id, query, &config.search),
        );

        Ok(weighted_merge(messages?, episodic?, config))
    }

    /// Drop every local-tier cache entry.
    pub fn clear_cache(&self) {
        self.searcher.cache().clear();
    }

    /// Wait for pending write-behind shared-tier writes.
    pub async fn flush_shared_writes(&self) {
        self.searcher.cache().flush_shared_writes().await;
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.searcher.cache().stats()
    }

    /// Single-source searches that degraded to an empty list.
    pub fn failed_searches(&self) -> u64 {
        self.failed_searches.load(Ordering::Relaxed)
    }

    async fn run(
        &self,
        query: &str,
        window: &dyn CandidateWindow,
        config: &SearchConfig,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let search = self.searcher.search(query, window, config);
        match self.options.search_timeout {
            Some(limit) => tokio::time::timeout(limit, search)
                .await
                .map_err(|_| SearchError::Timeout(limit))?,
            None => search.await,
        }
    }

    fn settle(
        &self,
        source: ResultSource,
        outcome: Result<Vec<SearchResult>, SearchError>,
    ) -> Result<Vec<SearchResult>, SearchError> {
        match (outcome, self.options.failure_policy) {
            (Ok(results), _) => Ok(results),
            (Err(e), FailurePolicy::Propagate) => Err(e),
            (Err(e), FailurePolicy::RecoverableEmpty) => {
                self.failed_searches.fetch_add(1, Ordering::Relaxed);
                warn!(%source, error = %e, "Search degraded to empty result");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;

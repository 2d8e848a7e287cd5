//! Single-source semantic search.
//!
//! One pass: embed the query, fetch a bounded candidate window, embed every
//! candidate through the cache, batch-score, adjust, filter, sort and
//! truncate. Only the top-K of the fetched window is guaranteed, not of the
//! whole corpus.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use futures::stream::{self, StreamExt};
use tracing::debug;

use recall_protocols::{
    EmbeddingVector, EpisodicSource, MessageSource, ResultSource, SearchCandidate, SearchConfig,
    SearchError, SearchResult, SourceError,
};

use crate::cache::EmbeddingCache;
use crate::similarity::batch_cosine_similarity;

/// A bounded, recency-filtered slice of one corpus.
#[async_trait]
pub trait CandidateWindow: Send + Sync {
    /// Tag applied to every result drawn from this window.
    fn source(&self) -> ResultSource;

    /// Fetch candidates created at or after `since`.
    async fn fetch(&self, since: DateTime<Utc>) -> Result<Vec<SearchCandidate>, SourceError>;

    /// Turn a raw similarity into the score used for filtering and ranking.
    fn adjust_score(&self, _candidate: &SearchCandidate, similarity: f32) -> f32 {
        similarity
    }
}

/// Recent user messages for one agent/user pair.
pub struct MessageWindow<'a> {
    pub source: &'a dyn MessageSource,
    pub agent_id: &'a str,
    pub user_id: &'a str,
    pub limit: usize,
}

#[async_trait]
impl CandidateWindow for MessageWindow<'_> {
    fn source(&self) -> ResultSource {
        ResultSource::Message
    }

    async fn fetch(&self, since: DateTime<Utc>) -> Result<Vec<SearchCandidate>, SourceError> {
        self.source
            .fetch_recent_user_messages(self.agent_id, self.user_id, since, self.limit)
            .await
    }
}

/// Episodic memories of one agent, most important first.
pub struct EpisodicWindow<'a> {
    pub source: &'a dyn EpisodicSource,
    pub agent_id: &'a str,
    pub limit: usize,
    /// Share of a memory's importance added to its similarity.
    pub importance_weight: f32,
}

#[async_trait]
impl CandidateWindow for EpisodicWindow<'_> {
    fn source(&self) -> ResultSource {
        ResultSource::Episodic
    }

    async fn fetch(&self, since: DateTime<Utc>) -> Result<Vec<SearchCandidate>, SourceError> {
        self.source
            .fetch_memories(self.agent_id, since, self.limit, true)
            .await
    }

    fn adjust_score(&self, candidate: &SearchCandidate, similarity: f32) -> f32 {
        importance_boost(
            similarity,
            candidate.importance.unwrap_or(0.0),
            self.importance_weight,
        )
    }
}

/// `min(1, similarity + importance * weight)`.
pub fn importance_boost(similarity: f32, importance: f32, weight: f32) -> f32 {
    (similarity + importance * weight).min(1.0)
}

/// Stable descending sort by score, then truncation to `k`.
///
/// Equal scores keep their input order.
pub fn select_top_k(mut results: Vec<SearchResult>, k: usize) -> Vec<SearchResult> {
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(k);
    results
}

/// Executes retrieval passes against any [`CandidateWindow`].
pub struct SourceSearcher {
    cache: Arc<EmbeddingCache>,
    embed_concurrency: usize,
}

impl SourceSearcher {
    pub fn new(cache: Arc<EmbeddingCache>) -> Self {
        Self {
            cache,
            embed_concurrency: 8,
        }
    }

    /// Maximum candidate embeddings resolved at once.
    pub fn with_embed_concurrency(mut self, concurrency: usize) -> Self {
        self.embed_concurrency = concurrency.max(1);
        self
    }

    pub fn cache(&self) -> &Arc<EmbeddingCache> {
        &self.cache
    }

    /// Run one search, ordered by descending score.
    ///
    /// Fails if the query cannot be embedded or the window cannot be
    /// fetched. A candidate that cannot be embedded is skipped.
    pub async fn search(
        &self,
        query: &str,
        window: &dyn CandidateWindow,
        config: &SearchConfig,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let source = window.source();
        let query_embedding = self.cache.resolve(query, config).await?;

        let since = recency_cutoff(Utc::now(), config.max_age_days);
        let candidates = window.fetch(since).await?;
        if candidates.is_empty() {
            debug!(%source, "No candidates in window");
            return Ok(Vec::new());
        }

        let fetched = candidates.len();
        let (candidates, vectors) = self.embed_candidates(candidates, config).await;
        let scores = batch_cosine_similarity(&query_embedding, &vectors);

        let results: Vec<SearchResult> = candidates
            .into_iter()
            .zip(scores)
            .filter_map(|(candidate, similarity)| {
                let score = window.adjust_score(&candidate, similarity);
                (score >= config.min_score)
                    .then(|| SearchResult::from_candidate(candidate, score, source))
            })
            .collect();
        let qualifying = results.len();
        let results = select_top_k(results, config.top_k);

        debug!(
            %source,
            fetched,
            embedded = vectors.len(),
            qualifying,
            returned = results.len(),
            "Search pass complete"
        );
        Ok(results)
    }

    /// Resolve candidate embeddings in input order, dropping failures.
    async fn embed_candidates(
        &self,
        candidates: Vec<SearchCandidate>,
        config: &SearchConfig,
    ) -> (Vec<SearchCandidate>, Vec<EmbeddingVector>) {
        let resolved: Vec<_> = stream::iter(
            candidates
                .iter()
                .map(|candidate| self.cache.resolve(&candidate.content, config)),
        )
        .buffered(self.embed_concurrency)
        .collect()
        .await;

        let mut kept = Vec::with_capacity(candidates.len());
        let mut vectors = Vec::with_capacity(candidates.len());
        for (candidate, embedding) in candidates.into_iter().zip(resolved) {
            match embedding {
                Ok(vector) => {
                    kept.push(candidate);
                    vectors.push(vector);
                }
                Err(e) => {
                    debug!(candidate = %candidate.id, error = %e, "Skipping candidate without embedding");
                }
            }
        }

        (kept, vectors)
    }
}

fn recency_cutoff(now: DateTime<Utc>, max_age_days: u32) -> DateTime<Utc> {
    now.checked_sub_signed(TimeDelta::days(i64::from(max_age_days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
#[path = "searcher_tests.rs"]
mod tests;

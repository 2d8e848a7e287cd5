use super::*;
use std::collections::HashMap;

use recall_protocols::{EmbeddingError, EmbeddingProvider};

use crate::cache::EmbeddingCacheConfig;
use crate::source::{InMemoryEpisodicSource, InMemoryMessageSource};

/// Looks texts up in a fixed table; unknown texts fail.
struct TableEmbedding {
    vectors: HashMap<String, EmbeddingVector>,
    dimension: usize,
}

impl TableEmbedding {
    fn new(dimension: usize, entries: &[(&str, Vec<f32>)]) -> Arc<Self> {
        Arc::new(Self {
            vectors: entries
                .iter()
                .map(|(text, v)| (text.to_string(), v.clone()))
                .collect(),
            dimension,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for TableEmbedding {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| EmbeddingError::Failed(format!("no embedding for {text}")))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

struct BrokenSource;

#[async_trait]
impl MessageSource for BrokenSource {
    async fn fetch_recent_user_messages(
        &self,
        _agent_id: &str,
        _user_id: &str,
        _since: DateTime<Utc>,
        _limit: usize,
    ) -> Result<Vec<SearchCandidate>, SourceError> {
        Err(SourceError::Connection("database unreachable".to_string()))
    }
}

fn searcher(provider: Arc<TableEmbedding>) -> SourceSearcher {
    let cache = Arc::new(EmbeddingCache::new(provider, EmbeddingCacheConfig::default()));
    SourceSearcher::new(cache)
}

fn message(id: &str, content: &str) -> SearchCandidate {
    SearchCandidate::new(id, content, Utc::now())
}

fn window<'a>(source: &'a InMemoryMessageSource) -> MessageWindow<'a> {
    MessageWindow {
        source,
        agent_id: "agent",
        user_id: "user",
        limit: 200,
    }
}

#[tokio::test]
async fn test_top_k_truncation_keeps_highest_scores() {
    let mut entries = vec![("query", vec![1.0, 0.0])];
    let texts: Vec<String> = (0..10).map(|i| format!("text-{i}")).collect();
    for (i, text) in texts.iter().enumerate() {
        entries.push((text.as_str(), vec![1.0, i as f32 * 0.3]));
    }
    let searcher = searcher(TableEmbedding::new(2, &entries));

    let source = InMemoryMessageSource::new();
    // Insert in an order unrelated to score.
    for i in [4, 9, 0, 7, 2, 5, 1, 8, 3, 6] {
        source.push_user("agent", "user", message(&format!("m-{i}"), &texts[i]));
    }

    let config = SearchConfig::default().with_top_k(3).with_min_score(0.0);
    let results = searcher.search("query", &window(&source), &config).await.unwrap();

    assert_eq!(results.len(), 3);
    let ids: Vec<_> = results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["m-0", "m-1", "m-2"]);
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));

    // Every returned score beats every excluded one.
    let full = searcher
        .search("query", &window(&source), &config.clone().with_top_k(10))
        .await
        .unwrap();
    let lowest_kept = results.last().unwrap().score;
    assert!(full[3..].iter().all(|r| r.score <= lowest_kept));
}

#[tokio::test]
async fn test_min_score_filter() {
    let searcher = searcher(TableEmbedding::new(
        2,
        &[
            ("query", vec![1.0, 0.0]),
            ("close", vec![1.0, 0.1]),
            ("far", vec![0.0, 1.0]),
            ("borderline", vec![1.0, 1.0]),
        ],
    ));
    let source = InMemoryMessageSource::new();
    source.push_user("agent", "user", message("close", "close"));
    source.push_user("agent", "user", message("far", "far"));
    source.push_user("agent", "user", message("borderline", "borderline"));

    // cos(45deg) ~= 0.7071 sits just under the bound.
    let config = SearchConfig::default().with_top_k(10).with_min_score(0.71);
    let results = searcher.search("query", &window(&source), &config).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "close");
    assert!(results.iter().all(|r| r.score >= 0.71));
}

#[tokio::test]
async fn test_min_score_is_inclusive() {
    let searcher = searcher(TableEmbedding::new(
        2,
        &[("query", vec![1.0, 0.0]), ("same", vec![2.0, 0.0])],
    ));
    let source = InMemoryMessageSource::new();
    source.push_user("agent", "user", message("same", "same"));

    let config = SearchConfig::default().with_min_score(1.0);
    let results = searcher.search("query", &window(&source), &config).await.unwrap();
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn test_ties_keep_fetch_order() {
    let searcher = searcher(TableEmbedding::new(
        2,
        &[
            ("query", vec![1.0, 0.0]),
            ("a", vec![1.0, 1.0]),
            ("b", vec![1.0, 1.0]),
            ("c", vec![1.0, 1.0]),
        ],
    ));
    let now = Utc::now();
    let source = InMemoryMessageSource::new();
    // Most recent first: c, b, a.
    source.push_user("agent", "user", SearchCandidate::new("a", "a", now - TimeDelta::minutes(3)));
    source.push_user("agent", "user", SearchCandidate::new("b", "b", now - TimeDelta::minutes(2)));
    source.push_user("agent", "user", SearchCandidate::new("c", "c", now - TimeDelta::minutes(1)));

    let config = SearchConfig::default().with_min_score(0.0);
    let results = searcher.search("query", &window(&source), &config).await.unwrap();
    let ids: Vec<_> = results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "b", "a"]);
}

#[tokio::test]
async fn test_importance_boost_and_clamp() {
    let searcher = searcher(TableEmbedding::new(
        2,
        &[
            ("query", vec![1.0, 0.0]),
            // cos = 0.6
            ("modest", vec![0.6, 0.8]),
            // cos ~= 0.995
            ("strong", vec![1.0, 0.1]),
        ],
    ));
    let source = InMemoryEpisodicSource::new();
    source.push("agent", message("modest", "modest").with_importance(1.0));
    source.push("agent", message("strong", "strong").with_importance(0.5));

    let window = EpisodicWindow {
        source: &source,
        agent_id: "agent",
        limit: 100,
        importance_weight: 0.2,
    };
    let config = SearchConfig::default().with_min_score(0.0);
    let results = searcher.search("query", &window, &config).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, "strong");
    assert_eq!(results[0].score, 1.0);
    assert!((results[1].score - 0.8).abs() < 1e-5);
    assert!(results.iter().all(|r| r.source == ResultSource::Episodic));
}

#[tokio::test]
async fn test_importance_boost_lifts_over_min_score() {
    let searcher = searcher(TableEmbedding::new(
        2,
        &[("query", vec![1.0, 0.0]), ("memory", vec![0.45, 0.893])],
    ));
    let source = InMemoryEpisodicSource::new();
    source.push("agent", message("memory", "memory").with_importance(0.5));

    let window = EpisodicWindow {
        source: &source,
        agent_id: "agent",
        limit: 100,
        importance_weight: 0.2,
    };
    // Raw ~0.45 would fail 0.5; boosted ~0.55 passes.
    let results = searcher
        .search("query", &window, &SearchConfig::default())
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
}

#[test]
fn test_importance_boost_formula() {
    assert!((importance_boost(0.5, 0.5, 0.2) - 0.6).abs() < 1e-6);
    assert_eq!(importance_boost(0.9, 1.0, 0.2), 1.0);
    assert_eq!(importance_boost(0.4, 1.0, 0.0), 0.4);
}

#[tokio::test]
async fn test_unembeddable_candidate_is_skipped() {
    let searcher = searcher(TableEmbedding::new(
        2,
        &[("query", vec![1.0, 0.0]), ("known", vec![1.0, 0.0])],
    ));
    let source = InMemoryMessageSource::new();
    source.push_user("agent", "user", message("known", "known"));
    source.push_user("agent", "user", message("unknown", "unknown"));

    let results = searcher
        .search("query", &window(&source), &SearchConfig::default())
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "known");
}

#[tokio::test]
async fn test_query_embedding_failure_is_error() {
    let searcher = searcher(TableEmbedding::new(2, &[("known", vec![1.0, 0.0])]));
    let source = InMemoryMessageSource::new();
    source.push_user("agent", "user", message("known", "known"));

    let err = searcher
        .search("missing query", &window(&source), &SearchConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Provider(_)));
}

#[tokio::test]
async fn test_query_dimension_mismatch_is_fatal() {
    let searcher = searcher(TableEmbedding::new(
        2,
        &[("query", vec![1.0, 0.0, 0.0]), ("known", vec![1.0, 0.0])],
    ));
    let source = InMemoryMessageSource::new();
    source.push_user("agent", "user", message("known", "known"));

    let err = searcher
        .search("query", &window(&source), &SearchConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SearchError::DimensionMismatch {
            expected: 2,
            actual: 3
        }
    ));
}

#[tokio::test]
async fn test_source_failure_is_error() {
    let searcher = searcher(TableEmbedding::new(2, &[("query", vec![1.0, 0.0])]));
    let window = MessageWindow {
        source: &BrokenSource,
        agent_id: "agent",
        user_id: "user",
        limit: 200,
    };
    let err = searcher
        .search("query", &window, &SearchConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::SourceFetch(_)));
}

#[tokio::test]
async fn test_empty_window() {
    let searcher = searcher(TableEmbedding::new(2, &[("query", vec![1.0, 0.0])]));
    let source = InMemoryMessageSource::new();
    let results = searcher
        .search("query", &window(&source), &SearchConfig::default())
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_recency_window_applied() {
    let searcher = searcher(TableEmbedding::new(
        2,
        &[("query", vec![1.0, 0.0]), ("old", vec![1.0, 0.0]), ("new", vec![1.0, 0.0])],
    ));
    let now = Utc::now();
    let source = InMemoryMessageSource::new();
    source.push_user("agent", "user", SearchCandidate::new("old", "old", now - TimeDelta::days(40)));
    source.push_user("agent", "user", SearchCandidate::new("new", "new", now - TimeDelta::days(2)));

    let config = SearchConfig::default().with_max_age_days(30);
    let results = searcher.search("query", &window(&source), &config).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "new");
    assert_eq!(results[0].source, ResultSource::Message);
}

#[tokio::test]
async fn test_candidate_window_cap() {
    let searcher = searcher(TableEmbedding::new(
        2,
        &[("query", vec![1.0, 0.0]), ("x", vec![1.0, 0.0])],
    ));
    let source = InMemoryMessageSource::new();
    for i in 0..5 {
        source.push_user("agent", "user", message(&format!("m-{i}"), "x"));
    }
    let capped = MessageWindow {
        limit: 2,
        ..window(&source)
    };
    let results = searcher
        .search("query", &capped, &SearchConfig::default())
        .await
        .unwrap();
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn test_candidates_share_cache() {
    let searcher = searcher(TableEmbedding::new(
        2,
        &[("query", vec![1.0, 0.0]), ("dup", vec![1.0, 0.0])],
    ));
    let source = InMemoryMessageSource::new();
    source.push_user("agent", "user", message("a", "dup"));
    source.push_user("agent", "user", message("b", "dup"));

    searcher
        .search("query", &window(&source), &SearchConfig::default())
        .await
        .unwrap();
    assert_eq!(searcher.cache().stats().size, 2);
}

#[test]
fn test_recency_cutoff_saturates() {
    let cutoff = recency_cutoff(Utc::now(), u32::MAX);
    assert!(cutoff <= Utc::now());
}

#[test]
fn test_select_top_k_is_stable() {
    let now = Utc::now();
    let results = ["a", "b", "c", "d"]
        .iter()
        .zip([0.5, 0.9, 0.5, 0.1])
        .map(|(id, score)| {
            SearchResult::from_candidate(SearchCandidate::new(*id, *id, now), score, ResultSource::Message)
        })
        .collect();
    let top = select_top_k(results, 3);
    let ids: Vec<_> = top.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a", "c"]);
}

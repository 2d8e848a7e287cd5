//! Weighted merge of per-source result lists.

use recall_protocols::{HybridConfig, SearchResult};
use recall_memory_vector::select_top_k;

/// Scale each source's scores by its weight, merge, sort and truncate.
///
/// Scores are not renormalised; they only order results within one call.
/// Ties keep message results ahead of episodic ones.
pub fn weighted_merge(
    messages: Vec<SearchResult>,
    episodic: Vec<SearchResult>,
    config: &HybridConfig,
) -> Vec<SearchResult> {
    let weighted = messages
        .into_iter()
        .map(|result| reweight(result, config.message_weight))
        .chain(
            episodic
                .into_iter()
                .map(|result| reweight(result, config.episodic_weight)),
        )
        .collect();

    select_top_k(weighted, config.search.top_k)
}

fn reweight(mut result: SearchResult, weight: f32) -> SearchResult {
    result.score *= weight;
    result
}

//! Candidate source protocols.
//!
//! Each source returns a bounded, recency-filtered window of candidates from
//! persistent storage. Scoring cost is bounded by `limit`, so the engine only
//! guarantees top-K over that window, not over the full corpus.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::SourceError;
use crate::types::SearchCandidate;

/// Recent conversational turns authored by the user.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// User-role messages for the agent/user pair with
    /// `timestamp >= since`, most recent first, at most `limit` items.
    async fn fetch_recent_user_messages(
        &self,
        agent_id: &str,
        user_id: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<SearchCandidate>, SourceError>;
}

/// Distilled episodic memories of an agent.
#[async_trait]
pub trait EpisodicSource: Send + Sync {
    /// Memories for the agent with `timestamp >= since`, at most `limit`
    /// items. Each candidate carries an `importance` in [0, 1].
    async fn fetch_memories(
        &self,
        agent_id: &str,
        since: DateTime<Utc>,
        limit: usize,
        order_by_importance_desc: bool,
    ) -> Result<Vec<SearchCandidate>, SourceError>;
}

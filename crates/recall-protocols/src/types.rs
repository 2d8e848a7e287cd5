//! Common types shared by the retrieval engine and its collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier type.
pub type Id = String;

/// Metadata map type.
pub type Metadata = HashMap<String, serde_json::Value>;

/// Fixed-dimension embedding of a text.
///
/// All vectors compared to one another must share a dimension; a mismatch is
/// a scoring error, never a panic.
pub type EmbeddingVector = Vec<f32>;

/// Which corpus a result was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    Message,
    Episodic,
}

impl std::fmt::Display for ResultSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Message => write!(f, "message"),
            Self::Episodic => write!(f, "episodic"),
        }
    }
}

/// Author of a conversational turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

impl std::str::FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "system" => Ok(Self::System),
            other => Err(format!("unknown message role: {other}")),
        }
    }
}

/// A read-only snapshot of a corpus item fetched for one search call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCandidate {
    pub id: Id,

    /// Text that gets embedded and returned as result content.
    pub content: String,

    /// Creation or event time; drives the recency window.
    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Corpus-assigned importance in [0, 1] (episodic memories only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub importance: Option<f32>,
}

impl SearchCandidate {
    pub fn new(id: impl Into<Id>, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            timestamp,
            metadata: HashMap::new(),
            importance: None,
        }
    }

    pub fn with_importance(mut self, importance: f32) -> Self {
        self.importance = Some(importance.clamp(0.0, 1.0));
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// A scored match produced fresh for each call; never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: Id,
    pub content: String,

    /// Similarity score. Single-source scores are cosine similarities (plus
    /// the clamped importance boost for episodic memories); hybrid scores are
    /// weighted and only meaningful for ordering within one call.
    pub score: f32,

    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub metadata: Metadata,

    pub source: ResultSource,
}

impl SearchResult {
    pub fn from_candidate(candidate: SearchCandidate, score: f32, source: ResultSource) -> Self {
        Self {
            id: candidate.id,
            content: candidate.content,
            score,
            timestamp: candidate.timestamp,
            metadata: candidate.metadata,
            source,
        }
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;

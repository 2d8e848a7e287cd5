//! In-memory candidate sources.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use recall_protocols::{
    EpisodicSource, MessageRole, MessageSource, SearchCandidate, SourceError,
};

struct StoredMessage {
    agent_id: String,
    user_id: String,
    role: MessageRole,
    candidate: SearchCandidate,
}

/// Conversation log held in memory.
#[derive(Default)]
pub struct InMemoryMessageSource {
    messages: RwLock<Vec<StoredMessage>>,
}

impl InMemoryMessageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &self,
        agent_id: impl Into<String>,
        user_id: impl Into<String>,
        role: MessageRole,
        candidate: SearchCandidate,
    ) {
        self.messages.write().push(StoredMessage {
            agent_id: agent_id.into(),
            user_id: user_id.into(),
            role,
            candidate,
        });
    }

    /// Shorthand for a user-authored message.
    pub fn push_user(
        &self,
        agent_id: impl Into<String>,
        user_id: impl Into<String>,
        candidate: SearchCandidate,
    ) {
        self.push(agent_id, user_id, MessageRole::User, candidate);
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }
}

#[async_trait]
impl MessageSource for InMemoryMessageSource {
    async fn fetch_recent_user_messages(
        &self,
        agent_id: &str,
        user_id: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<SearchCandidate>, SourceError> {
        let messages = self.messages.read();
        let mut window: Vec<SearchCandidate> = messages
            .iter()
            .filter(|m| {
                m.agent_id == agent_id
                    && m.user_id == user_id
                    && m.role == MessageRole::User
                    && m.candidate.timestamp >= since
            })
            .map(|m| m.candidate.clone())
            .collect();

        window.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        window.truncate(limit);
        Ok(window)
    }
}

/// Episodic memories held in memory.
#[derive(Default)]
pub struct InMemoryEpisodicSource {
    memories: RwLock<Vec<(String, SearchCandidate)>>,
}

impl InMemoryEpisodicSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, agent_id: impl Into<String>, candidate: SearchCandidate) {
        self.memories.write().push((agent_id.into(), candidate));
    }

    pub fn len(&self) -> usize {
        self.memories.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.memories.read().is_empty()
    }
}

#[async_trait]
impl EpisodicSource for InMemoryEpisodicSource {
    async fn fetch_memories(
        &self,
        agent_id: &str,
        since: DateTime<Utc>,
        limit: usize,
        order_by_importance_desc: bool,
    ) -> Result<Vec<SearchCandidate>, SourceError> {
        let memories = self.memories.read();
        let mut window: Vec<SearchCandidate> = memories
            .iter()
            .filter(|(agent, m)| agent == agent_id && m.timestamp >= since)
            .map(|(_, m)| m.clone())
            .collect();

        if order_by_importance_desc {
            window.sort_by(|a, b| {
                let (a, b) = (a.importance.unwrap_or(0.0), b.importance.unwrap_or(0.0));
                b.total_cmp(&a)
            });
        } else {
            window.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        }
        window.truncate(limit);
        Ok(window)
    }
}

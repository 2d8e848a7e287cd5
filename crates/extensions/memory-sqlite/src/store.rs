//! SQLite-backed candidate sources.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Row};
use std::path::Path;
use tokio_rusqlite::Connection;
use tracing::debug;

use recall_protocols::{
    EpisodicSource, MessageRole, MessageSource, Metadata, SearchCandidate, SourceError,
};

use crate::schema::init_schema;

/// Optional attributes of an episodic memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDetails {
    /// Emotional valence of the event, typically in [-1, 1].
    pub emotional_valence: Option<f32>,
    pub character_emotion: Option<String>,
    pub user_emotion: Option<String>,
    /// Creation time; `None` means now.
    pub created_at: Option<DateTime<Utc>>,
    pub metadata: Metadata,
}

/// Messages and episodic memories in one SQLite database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new in-memory database.
    pub async fn in_memory() -> Result<Self, SourceError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| SourceError::Connection(e.to_string()))?;
        Self::init(conn).await
    }

    /// Open (or create) a file-backed database.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path)
            .await
            .map_err(|e| SourceError::Connection(e.to_string()))?;
        debug!(path = %path.display(), "Opened SQLite store");
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, SourceError> {
        conn.call(|conn| Ok(init_schema(conn)?))
            .await
            .map_err(|e| SourceError::Query(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Record a conversation message timestamped now.
    pub async fn add_message(
        &self,
        agent_id: &str,
        user_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<String, SourceError> {
        self.add_message_at(agent_id, user_id, role, content, Utc::now())
            .await
    }

    /// Record a conversation message with an explicit timestamp.
    pub async fn add_message_at(
        &self,
        agent_id: &str,
        user_id: &str,
        role: MessageRole,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> Result<String, SourceError> {
        let id = uuid::Uuid::new_v4().to_string();
        let row = (
            id.clone(),
            agent_id.to_string(),
            user_id.to_string(),
            role.as_str(),
            content.to_string(),
            format_timestamp(&created_at),
        );

        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO messages (id, agent_id, user_id, role, content, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![row.0, row.1, row.2, row.3, row.4, row.5],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| SourceError::Query(e.to_string()))?;

        debug!(id = %id, agent_id, role = role.as_str(), "Stored message");
        Ok(id)
    }

    /// Record an episodic memory. `importance` is clamped to [0, 1].
    pub async fn add_memory(
        &self,
        agent_id: &str,
        event: &str,
        importance: f32,
        details: MemoryDetails,
    ) -> Result<String, SourceError> {
        let id = uuid::Uuid::new_v4().to_string();
        let metadata = serde_json::to_string(&details.metadata)
            .map_err(|e| SourceError::Query(e.to_string()))?;
        let created = format_timestamp(&details.created_at.unwrap_or_else(Utc::now));
        let importance = f64::from(importance.clamp(0.0, 1.0));
        let valence = details.emotional_valence.map(f64::from);

        let id_clone = id.clone();
        let agent = agent_id.to_string();
        let event = event.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO episodic_memories
                     (id, agent_id, event, importance, emotional_valence, character_emotion,
                      user_emotion, created_at, metadata)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    params![
                        id_clone,
                        agent,
                        event,
                        importance,
                        valence,
                        details.character_emotion,
                        details.user_emotion,
                        created,
                        metadata
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| SourceError::Query(e.to_string()))?;

        debug!(id = %id, agent_id, importance, "Stored episodic memory");
        Ok(id)
    }
}

#[async_trait]
impl MessageSource for SqliteStore {
    async fn fetch_recent_user_messages(
        &self,
        agent_id: &str,
        user_id: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<SearchCandidate>, SourceError> {
        let agent = agent_id.to_string();
        let user = user_id.to_string();
        let since = format_timestamp(&since);
        let limit = sql_limit(limit);

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, content, created_at, metadata FROM messages
                     WHERE agent_id = ?1 AND user_id = ?2 AND role = ?3 AND created_at >= ?4
                     ORDER BY created_at DESC, rowid DESC
                     LIMIT ?5",
                )?;
                let rows = stmt.query_map(
                    params![agent, user, MessageRole::User.as_str(), since, limit],
                    message_from_row,
                )?;
                Ok(rows.collect::<Result<Vec<_>, _>>()?)
            })
            .await
            .map_err(|e| SourceError::Query(e.to_string()))
    }
}

#[async_trait]
impl EpisodicSource for SqliteStore {
    async fn fetch_memories(
        &self,
        agent_id: &str,
        since: DateTime<Utc>,
        limit: usize,
        order_by_importance_desc: bool,
    ) -> Result<Vec<SearchCandidate>, SourceError> {
        let agent = agent_id.to_string();
        let since = format_timestamp(&since);
        let limit = sql_limit(limit);
        let order = if order_by_importance_desc {
            "importance DESC, created_at DESC"
        } else {
            "created_at DESC"
        };
        let sql = format!(
            "SELECT id, event, created_at, metadata, importance, emotional_valence,
                    character_emotion, user_emotion
             FROM episodic_memories
             WHERE agent_id = ?1 AND created_at >= ?2
             ORDER BY {order}, rowid DESC
             LIMIT ?3"
        );

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params![agent, since, limit], memory_from_row)?;
                Ok(rows.collect::<Result<Vec<_>, _>>()?)
            })
            .await
            .map_err(|e| SourceError::Query(e.to_string()))
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn parse_metadata(raw: Option<String>) -> Metadata {
    raw.and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<SearchCandidate> {
    let id: String = row.get(0)?;
    let content: String = row.get(1)?;
    let created: String = row.get(2)?;
    let metadata = parse_metadata(row.get(3)?);

    let mut candidate = SearchCandidate::new(id, content, parse_timestamp(2, &created)?);
    candidate.metadata = metadata;
    Ok(candidate)
}

fn memory_from_row(row: &Row<'_>) -> rusqlite::Result<SearchCandidate> {
    let id: String = row.get(0)?;
    let event: String = row.get(1)?;
    let created: String = row.get(2)?;
    let mut metadata = parse_metadata(row.get(3)?);
    let importance: f64 = row.get(4)?;
    let valence: Option<f64> = row.get(5)?;
    let character_emotion: Option<String> = row.get(6)?;
    let user_emotion: Option<String> = row.get(7)?;

    metadata.insert("importance".to_string(), serde_json::json!(importance));
    if let Some(valence) = valence {
        metadata.insert("emotional_valence".to_string(), serde_json::json!(valence));
    }
    if let Some(emotion) = character_emotion {
        metadata.insert("character_emotion".to_string(), serde_json::json!(emotion));
    }
    if let Some(emotion) = user_emotion {
        metadata.insert("user_emotion".to_string(), serde_json::json!(emotion));
    }

    let mut candidate = SearchCandidate::new(id, event, parse_timestamp(2, &created)?)
        .with_importance(importance as f32);
    candidate.metadata = metadata;
    Ok(candidate)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

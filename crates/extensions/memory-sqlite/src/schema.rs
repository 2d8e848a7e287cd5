//! Schema creation, tracked through `PRAGMA user_version`.

use rusqlite::Connection;

pub(crate) const SCHEMA_VERSION: i32 = 1;

/// Bring `conn` up to [`SCHEMA_VERSION`]. A no-op on current databases.
pub(crate) fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if version >= SCHEMA_VERSION {
        return Ok(());
    }

    conn.execute_batch(SCHEMA_V1)?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)
}

// Timestamps are RFC 3339 UTC with a fixed microsecond width, so text
// comparison matches chronological order.
const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    agent_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('user', 'assistant', 'system')),
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,
    metadata TEXT DEFAULT '{}'
);

CREATE TABLE IF NOT EXISTS episodic_memories (
    id TEXT PRIMARY KEY,
    agent_id TEXT NOT NULL,
    event TEXT NOT NULL,
    importance REAL NOT NULL DEFAULT 0 CHECK (importance BETWEEN 0 AND 1),
    emotional_valence REAL,
    character_emotion TEXT,
    user_emotion TEXT,
    created_at TEXT NOT NULL,
    metadata TEXT DEFAULT '{}'
);

CREATE INDEX IF NOT EXISTS idx_messages_pair_created
    ON messages(agent_id, user_id, created_at);
CREATE INDEX IF NOT EXISTS idx_episodic_agent_created
    ON episodic_memories(agent_id, created_at);
CREATE INDEX IF NOT EXISTS idx_episodic_agent_importance
    ON episodic_memories(agent_id, importance);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn user_version(conn: &Connection) -> i32 {
        conn.pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_fresh_database_gets_tables_and_version() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(user_version(&conn), 0);
        init_schema(&conn).unwrap();

        for table in ["messages", "episodic_memories"] {
            let exists: bool = conn
                .query_row(
                    "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert!(exists, "missing table {table}");
        }
        assert_eq!(user_version(&conn), SCHEMA_VERSION);
    }

    #[test]
    fn test_reinit_is_noop() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO messages (id, agent_id, user_id, role, content, created_at)
             VALUES ('m1', 'a', 'u', 'user', 'hi', '2024-01-01T00:00:00.000000Z')",
            [],
        )
        .unwrap();

        init_schema(&conn).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_unknown_role_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let result = conn.execute(
            "INSERT INTO messages (id, agent_id, user_id, role, content, created_at)
             VALUES ('m1', 'a', 'u', 'narrator', 'hi', '2024-01-01T00:00:00.000000Z')",
            [],
        );
        assert!(result.is_err());
    }
}

//! SQLite storage for Recall.
//!
//! Persists conversation messages and episodic memories and serves them as
//! bounded, recency-filtered candidate windows.

mod schema;
mod store;

pub use store::{MemoryDetails, SqliteStore};

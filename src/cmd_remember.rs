//! Write-side subcommands.

use tracing::info;

use recall_memory_sqlite::{MemoryDetails, SqliteStore};
use recall_protocols::MessageRole;

/// Store one conversation message and print its id.
pub(crate) async fn remember_message(
    store: &SqliteStore,
    agent: &str,
    user: &str,
    role: MessageRole,
    content: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let id = store.add_message(agent, user, role, content).await?;
    info!(%id, agent, user, role = role.as_str(), "Message stored");
    println!("{id}");
    Ok(())
}

/// Store one episodic memory and print its id.
pub(crate) async fn remember_event(
    store: &SqliteStore,
    agent: &str,
    event: &str,
    importance: f32,
    details: MemoryDetails,
) -> Result<(), Box<dyn std::error::Error>> {
    if !(0.0..=1.0).contains(&importance) {
        return Err(format!("importance must be within [0, 1], got {importance}").into());
    }
    let id = store.add_memory(agent, event, importance, details).await?;
    info!(%id, agent, importance, "Episodic memory stored");
    println!("{id}");
    Ok(())
}

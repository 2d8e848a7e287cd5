//! Recall - semantic memory retrieval for conversational agents
//!
//! Main entry point for the Recall CLI.

mod adapters;
mod cli;
mod cmd_remember;
mod cmd_search;

use clap::Parser;
use tracing::{debug, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use recall_config::{Config, ConfigLoader, ConfigValidator};
use recall_memory_sqlite::MemoryDetails;

use crate::adapters::{build_engine, open_store, recall_dir};
use crate::cli::{Cli, Commands};
use crate::cmd_search::SearchArgs;

fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = recall_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("recall")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keeps the file writer flushing until exit.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        // Console on stderr; stdout carries command output.
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(true)
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
        )
        .init();

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let config = ConfigLoader::load_or_default(cli.config.as_deref())?;

    let validation = ConfigValidator::validate(&config);
    for warning in &validation.warnings {
        warn!("Config: {}", warning);
    }
    if let Some(err) = validation.into_error() {
        return Err(err.into());
    }

    debug!(storage = %config.storage.path, "Configuration loaded");
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let store = open_store(&config).await?;

    match cli.command {
        Commands::RememberMessage {
            agent,
            user,
            role,
            content,
        } => cmd_remember::remember_message(&store, &agent, &user, role, &content).await,
        Commands::RememberEvent {
            agent,
            importance,
            user_emotion,
            character_emotion,
            valence,
            event,
        } => {
            let details = MemoryDetails {
                emotional_valence: valence,
                character_emotion,
                user_emotion,
                ..MemoryDetails::default()
            };
            cmd_remember::remember_event(&store, &agent, &event, importance, details).await
        }
        Commands::Search {
            agent,
            user,
            source,
            top_k,
            min_score,
            stats,
            query,
        } => {
            let engine = build_engine(&config, store).await?;
            let args = SearchArgs {
                agent,
                user,
                source,
                top_k,
                min_score,
                stats,
                query,
            };
            cmd_search::search(&engine, &config, args).await
        }
    }
}

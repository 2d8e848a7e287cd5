//! CLI definitions for Recall.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use recall_protocols::MessageRole;

/// Recall CLI.
#[derive(Parser)]
#[command(name = "recall")]
#[command(about = "Semantic memory retrieval for conversational agents")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.recall/config.toml if present)
    #[arg(short, long, global = true, env = "RECALL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Store a conversation message
    RememberMessage {
        #[arg(long)]
        agent: String,

        #[arg(long)]
        user: String,

        /// Message author (user, assistant, system)
        #[arg(long, default_value = "user")]
        role: MessageRole,

        content: String,
    },

    /// Store an episodic memory
    RememberEvent {
        #[arg(long)]
        agent: String,

        /// Importance in [0, 1]
        #[arg(long, default_value_t = 0.5)]
        importance: f32,

        #[arg(long)]
        user_emotion: Option<String>,

        #[arg(long)]
        character_emotion: Option<String>,

        /// Emotional valence, typically in [-1, 1]
        #[arg(long, allow_negative_numbers = true)]
        valence: Option<f32>,

        event: String,
    },

    /// Search stored messages and memories
    Search {
        #[arg(long)]
        agent: String,

        /// Required for the messages and hybrid sources
        #[arg(long)]
        user: Option<String>,

        #[arg(long, value_enum, default_value_t = SourceArg::Hybrid)]
        source: SourceArg,

        /// Override `[search] top_k`
        #[arg(long)]
        top_k: Option<usize>,

        /// Override `[search] min_score`
        #[arg(long, allow_negative_numbers = true)]
        min_score: Option<f32>,

        /// Also print embedding cache statistics
        #[arg(long)]
        stats: bool,

        query: String,
    },
}

/// Corpus selected by `search --source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum SourceArg {
    Messages,
    Episodic,
    Hybrid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_defaults() {
        let cli = Cli::try_parse_from(["recall", "search", "--agent", "a", "--user", "u", "blue"])
            .unwrap();
        match cli.command {
            Commands::Search {
                agent,
                user,
                source,
                top_k,
                min_score,
                stats,
                query,
            } => {
                assert_eq!(agent, "a");
                assert_eq!(user.as_deref(), Some("u"));
                assert_eq!(source, SourceArg::Hybrid);
                assert!(top_k.is_none());
                assert!(min_score.is_none());
                assert!(!stats);
                assert_eq!(query, "blue");
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_parse_search_source() {
        let cli = Cli::try_parse_from([
            "recall", "search", "--agent", "a", "--source", "episodic", "--top-k", "3", "q",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Search {
                source: SourceArg::Episodic,
                top_k: Some(3),
                ..
            }
        ));
    }

    #[test]
    fn test_parse_remember_message_role() {
        let cli = Cli::try_parse_from([
            "recall",
            "remember-message",
            "--agent",
            "a",
            "--user",
            "u",
            "--role",
            "Assistant",
            "hello",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::RememberMessage {
                role: MessageRole::Assistant,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_remember_event_negative_valence() {
        let cli = Cli::try_parse_from([
            "recall",
            "--config",
            "/tmp/recall.toml",
            "remember-event",
            "--agent",
            "a",
            "--valence",
            "-0.5",
            "lost the match",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/recall.toml")));
        match cli.command {
            Commands::RememberEvent {
                importance,
                valence,
                ..
            } => {
                assert!((importance - 0.5).abs() < f32::EPSILON);
                assert_eq!(valence, Some(-0.5));
            }
            _ => panic!("expected remember-event"),
        }
    }

    #[test]
    fn test_unknown_role_rejected() {
        let result = Cli::try_parse_from([
            "recall",
            "remember-message",
            "--agent",
            "a",
            "--user",
            "u",
            "--role",
            "narrator",
            "hello",
        ]);
        assert!(result.is_err());
    }
}

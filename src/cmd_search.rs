//! Search subcommand.

use recall_config::Config;
use recall_memory_hybrid::RetrievalEngine;
use recall_protocols::SearchResult;

use crate::cli::SourceArg;

pub(crate) struct SearchArgs {
    pub agent: String,
    pub user: Option<String>,
    pub source: SourceArg,
    pub top_k: Option<usize>,
    pub min_score: Option<f32>,
    pub stats: bool,
    pub query: String,
}

/// Run one search and print the results as pretty JSON.
pub(crate) async fn search(
    engine: &RetrievalEngine,
    config: &Config,
    args: SearchArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let results = run_search(engine, config, &args).await;
    // The process exits next; spawned shared-tier writes would be dropped.
    engine.flush_shared_writes().await;
    let results = results?;
    println!("{}", serde_json::to_string_pretty(&results)?);

    if args.stats {
        let stats = engine.cache_stats().to_json();
        eprintln!("{}", serde_json::to_string_pretty(&stats)?);
    }
    Ok(())
}

async fn run_search(
    engine: &RetrievalEngine,
    config: &Config,
    args: &SearchArgs,
) -> Result<Vec<SearchResult>, Box<dyn std::error::Error>> {
    let mut hybrid = config.hybrid_config();
    if let Some(top_k) = args.top_k {
        hybrid.search.top_k = top_k;
    }
    if let Some(top_k) = args.top_k.filter(|k| *k == 0) {
        return Err(format!("--top-k must be greater than 0, got {}", top_k).into());
    }
    if let Some(min_score) = args.min_score {
        if !(-1.0..=1.0).contains(&min_score) {
            return Err(format!("--min-score must be within [-1, 1], got {}", min_score).into());
        }
        hybrid.search.min_score = min_score;
    }

    let results = match args.source {
        SourceArg::Episodic => {
            engine
                .search_episodic_memories(&args.agent, &args.query, &hybrid.search)
                .await?
        }
        SourceArg::Messages => {
            let user = require_user(args)?;
            engine
                .search_messages(&args.agent, user, &args.query, &hybrid.search)
                .await?
        }
        SourceArg::Hybrid => {
            let user = require_user(args)?;
            engine
                .hybrid_search(&args.agent, user, &args.query, &hybrid)
                .await?
        }
    };
    Ok(results)
}

fn require_user(args: &SearchArgs) -> Result<&str, Box<dyn std::error::Error>> {
    args.user
        .as_deref()
        .ok_or_else(|| "--user is required for this source".into())
}

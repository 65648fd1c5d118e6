use clap::ArgMatches;
use serde::Serialize;
use tracing::{error, info};

use agentboard_core::{PrInfo, ResourceKey, TerminalStore};
use agentboard_paths::BoardPaths;

use crate::color;

#[derive(Debug, Serialize)]
struct CachedReview {
    key: ResourceKey,
    pr_url: String,
    #[serde(flatten)]
    info: PrInfo,
    recorded_at: String,
}

pub(crate) fn handle_cache_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let paths = BoardPaths::resolve().map_err(|e| {
        eprintln!("{}", color::error(&format!("❌ {}", e)));
        e
    })?;
    let store = TerminalStore::load(paths.terminal_cache_file());

    match matches.subcommand() {
        Some(("show", sub)) => handle_cache_show(&store, sub.get_flag("json")),
        Some(("clear", _)) => handle_cache_clear(&store),
        _ => Err("Unknown cache subcommand".into()),
    }
}

fn handle_cache_show(store: &TerminalStore, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    info!(event = "cli.cache.show_started", json_output = json_output);

    let reviews: Vec<CachedReview> = store
        .records()
        .into_iter()
        .map(|(key, record)| CachedReview {
            pr_url: key.id().to_string(),
            key,
            info: record.value,
            recorded_at: record.recorded_at.to_rfc3339(),
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&reviews)?);
    } else if reviews.is_empty() {
        println!("No merged or closed pull requests cached.");
    } else {
        println!("Cached pull requests ({}):", reviews.len());
        for review in &reviews {
            println!(
                "   {} {} {}",
                color::pr_status(Some(review.info.status), &format!("{:<6}", review.info.status.to_string())),
                color::ice(&review.pr_url),
                color::muted(&format!("recorded {}", review.recorded_at))
            );
        }
    }

    info!(event = "cli.cache.show_completed", count = reviews.len());
    Ok(())
}

fn handle_cache_clear(store: &TerminalStore) -> Result<(), Box<dyn std::error::Error>> {
    info!(event = "cli.cache.clear_started");

    match store.clear() {
        Ok(removed) => {
            println!("✅ Cleared {} cached pull request(s).", removed);
            info!(event = "cli.cache.clear_completed", removed = removed);
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", color::error(&format!("❌ Failed to clear cache: {}", e)));
            error!(event = "cli.cache.clear_failed", error = %e);
            Err(e.into())
        }
    }
}

use clap::ArgMatches;
use tracing::{error, info};

use agentboard_core::{FetchError, PrInfo, ResourceKey, ResourceValue};

use super::helpers::{self, Context};
use crate::color;

pub(crate) fn handle_pr_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("status", sub)) => handle_pr_status(sub),
        Some(("comment", sub)) => handle_pr_comment(sub),
        Some(("ready", sub)) => handle_pr_ready(sub),
        _ => Err("Unknown pr subcommand".into()),
    }
}

fn handle_pr_status(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let url = matches
        .get_one::<String>("url")
        .ok_or("Pull request URL argument is required")?;
    let json_output = matches.get_flag("json");
    let config = helpers::load_config_with_warning(matches)?;

    info!(event = "cli.pr.status_started", pr_url = url);

    let ctx = helpers::open_context(config)?;
    let runtime = helpers::runtime()?;
    let result = runtime.block_on(review_status(&ctx, url));
    ctx.shutdown();

    match result {
        Ok(info) => {
            if json_output {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!(
                    "#{} {}{}",
                    info.number,
                    color::pr_status(Some(info.status), &info.status.to_string()),
                    if info.draft { " (draft)" } else { "" }
                );
                println!("   {}", info.title);
                println!("   Updated: {}", info.updated_at);
                if ctx.terminal().contains(&ResourceKey::review_status(url.as_str())) {
                    println!("   {}", color::muted("Cached permanently; will not be fetched again."));
                }
            }
            info!(event = "cli.pr.status_completed", pr_url = url, status = %info.status);
            Ok(())
        }
        Err(e) => {
            helpers::report_fetch_error("Failed to load pull request status", &e);
            error!(event = "cli.pr.status_failed", pr_url = url, error = %e);
            Err(e.into())
        }
    }
}

/// Served from the terminal store when known, otherwise fetched.
async fn review_status(ctx: &Context, url: &str) -> Result<PrInfo, FetchError> {
    let key = ResourceKey::review_status(url);
    let value = match ctx.cached_resource(&key) {
        Some(value) if ctx.executor().is_satisfied(&key) => value,
        _ => ctx.executor().fetch(&key, &ctx.shutdown_token()).await?,
    };
    match value {
        ResourceValue::ReviewStatus(info) => Ok(info),
        other => Err(FetchError::Malformed {
            message: format!("expected a review status, got {}", other.kind()),
        }),
    }
}

fn handle_pr_comment(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let url = matches
        .get_one::<String>("url")
        .ok_or("Pull request URL argument is required")?;
    let body = matches
        .get_one::<String>("body")
        .ok_or("Comment body argument is required")?;
    let config = helpers::load_config_with_warning(matches)?;

    info!(event = "cli.pr.comment_started", pr_url = url);

    let ctx = helpers::open_context(config)?;
    let runtime = helpers::runtime()?;
    let cancel = ctx.shutdown_token();
    match runtime.block_on(ctx.executor().comment_on_review(url, body, &cancel)) {
        Ok(()) => {
            println!("✅ Comment posted on {}", color::ice(url));
            info!(event = "cli.pr.comment_completed", pr_url = url);
            Ok(())
        }
        Err(e) => {
            helpers::report_fetch_error("Failed to post comment", &e);
            error!(event = "cli.pr.comment_failed", pr_url = url, error = %e);
            Err(e.into())
        }
    }
}

fn handle_pr_ready(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let url = matches
        .get_one::<String>("url")
        .ok_or("Pull request URL argument is required")?;
    let config = helpers::load_config_with_warning(matches)?;

    info!(event = "cli.pr.ready_started", pr_url = url);

    let ctx = helpers::open_context(config)?;
    let runtime = helpers::runtime()?;
    let cancel = ctx.shutdown_token();
    match runtime.block_on(ctx.executor().mark_ready_for_review(url, &cancel)) {
        Ok(()) => {
            println!("✅ Marked ready for review: {}", color::ice(url));
            info!(event = "cli.pr.ready_completed", pr_url = url);
            Ok(())
        }
        Err(e) => {
            helpers::report_fetch_error("Failed to mark pull request ready", &e);
            error!(event = "cli.pr.ready_failed", pr_url = url, error = %e);
            Err(e.into())
        }
    }
}

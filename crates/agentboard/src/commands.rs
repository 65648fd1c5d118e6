use clap::ArgMatches;
use tracing::{error, info};

mod agent;
mod cache;
mod comment;
mod followup;
mod helpers;
mod issue;
mod list;
mod pr;
mod watch;

use agent::handle_agent_command;
use cache::handle_cache_command;
use comment::handle_comment_command;
use followup::handle_followup_command;
use issue::handle_issue_command;
use list::handle_list_command;
use pr::handle_pr_command;
use watch::handle_watch_command;

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        event = "cli.app.startup_completed",
        version = env!("CARGO_PKG_VERSION")
    );

    match matches.subcommand() {
        Some(("watch", sub_matches)) => handle_watch_command(sub_matches),
        Some(("list", sub_matches)) => handle_list_command(sub_matches),
        Some(("agent", sub_matches)) => handle_agent_command(sub_matches),
        Some(("pr", sub_matches)) => handle_pr_command(sub_matches),
        Some(("followup", sub_matches)) => handle_followup_command(sub_matches),
        Some(("comment", sub_matches)) => handle_comment_command(sub_matches),
        Some(("issue", sub_matches)) => handle_issue_command(sub_matches),
        Some(("cache", sub_matches)) => handle_cache_command(sub_matches),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    }
}

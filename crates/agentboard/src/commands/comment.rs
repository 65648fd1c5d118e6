use clap::ArgMatches;
use tracing::{error, info};

use super::helpers;
use crate::color;

pub(crate) fn handle_comment_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let issue_url = matches
        .get_one::<String>("issue-url")
        .ok_or("Issue URL argument is required")?;
    let body = matches
        .get_one::<String>("body")
        .ok_or("Comment body argument is required")?;
    let config = helpers::load_config_with_warning(matches)?;

    info!(event = "cli.comment_started", issue_url = issue_url);

    let ctx = helpers::open_context(config)?;
    let runtime = helpers::runtime()?;
    let cancel = ctx.shutdown_token();
    match runtime.block_on(ctx.executor().comment_on_issue(issue_url, body, &cancel)) {
        Ok(()) => {
            println!("✅ Comment posted on {}", color::ice(issue_url));
            info!(event = "cli.comment_completed", issue_url = issue_url);
            Ok(())
        }
        Err(e) => {
            helpers::report_fetch_error("Failed to post comment", &e);
            error!(event = "cli.comment_failed", issue_url = issue_url, error = %e);
            Err(e.into())
        }
    }
}

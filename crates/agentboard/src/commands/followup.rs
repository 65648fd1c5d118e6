use clap::ArgMatches;
use tracing::{error, info};

use super::helpers;
use crate::color;

pub(crate) fn handle_followup_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let agent_id = matches
        .get_one::<String>("id")
        .ok_or("Agent id argument is required")?;
    let message = matches
        .get_one::<String>("message")
        .ok_or("Message argument is required")?;
    let config = helpers::load_config_with_warning(matches)?;

    info!(event = "cli.followup_started", agent_id = agent_id);

    let ctx = helpers::open_context(config)?;
    let runtime = helpers::runtime()?;
    let cancel = ctx.shutdown_token();
    match runtime.block_on(ctx.executor().send_followup(agent_id, message, &cancel)) {
        Ok(()) => {
            println!("✅ Follow-up sent to {}", color::kiri(agent_id));
            info!(event = "cli.followup_completed", agent_id = agent_id);
            Ok(())
        }
        Err(e) => {
            helpers::report_fetch_error("Failed to send follow-up", &e);
            error!(event = "cli.followup_failed", agent_id = agent_id, error = %e);
            Err(e.into())
        }
    }
}

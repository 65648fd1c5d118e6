use clap::ArgMatches;
use tracing::{error, info};

use agentboard_core::{Dashboard, Orchestrator};

use super::helpers;
use crate::color;
use crate::table::TableFormatter;

pub(crate) fn handle_list_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    let config = helpers::load_config_with_warning(matches)?;
    let filter = helpers::dashboard_filter(&config, matches.get_flag("all"));

    info!(
        event = "cli.list_started",
        json_output = json_output,
        relay = config.relay.base_url()
    );

    let ctx = helpers::open_context(config)?;
    let runtime = helpers::runtime()?;
    let orchestrator = Orchestrator::new(ctx.clone());

    match runtime.block_on(orchestrator.poll_once()) {
        Ok(report) => {
            let dashboard = ctx.dashboard(&filter);
            if json_output {
                println!("{}", serde_json::to_string_pretty(&dashboard)?);
            } else {
                print_dashboard(&dashboard);
            }

            info!(
                event = "cli.list_completed",
                agents = report.agents,
                shown = dashboard.rows.len(),
                statuses_failed = report.statuses.failed,
                comments_failed = report.comments.failed
            );
            ctx.shutdown();
            Ok(())
        }
        Err(e) => {
            helpers::report_fetch_error("Failed to list agents", &e);
            error!(event = "cli.list_failed", error = %e);
            ctx.shutdown();
            Err(e.into())
        }
    }
}

pub(crate) fn print_dashboard(dashboard: &Dashboard) {
    if dashboard.rows.is_empty() {
        println!("No agents found.");
    } else {
        let formatter = TableFormatter::new(&dashboard.rows);
        formatter.print_table(&dashboard.rows);
    }
    if dashboard.hidden > 0 {
        println!(
            "{}",
            color::muted(&format!(
                "{} hidden (expired, merged or closed). Use --all to show them.",
                dashboard.hidden
            ))
        );
    }
}

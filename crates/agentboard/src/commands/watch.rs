use std::io::IsTerminal;
use std::time::Duration;

use clap::ArgMatches;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use agentboard_core::{
    DashboardFilter, Orchestrator, PollState, StatusTracker, StatusTransition, TransitionKind,
};

use super::helpers::{self, Context};
use super::list::print_dashboard;
use crate::color;

pub(crate) fn handle_watch_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let config = helpers::load_config_with_warning(matches)?;
    let interval = matches
        .get_one::<u64>("interval")
        .map(|secs| Duration::from_secs(*secs))
        .unwrap_or_else(|| config.sync.poll_interval());
    let filter = helpers::dashboard_filter(&config, matches.get_flag("all"));

    info!(
        event = "cli.watch_started",
        interval_secs = interval.as_secs(),
        relay = config.relay.base_url()
    );

    let ctx = helpers::open_context(config)?;
    let runtime = helpers::runtime()?;
    runtime.block_on(watch(ctx, interval, filter));
    // The stdin reader sits on a blocking thread that never returns by itself.
    runtime.shutdown_timeout(Duration::from_millis(200));

    info!(event = "cli.watch_completed");
    Ok(())
}

/// Redraw after every finished cycle until Ctrl-C. Typing `r` + Enter forces
/// a refresh.
async fn watch(ctx: Context, interval: Duration, filter: DashboardFilter) {
    let mut states = ctx.watch_poll_state();
    let poller = Orchestrator::new(ctx.clone()).with_interval(interval).spawn();
    let mut tracker = StatusTracker::new();
    let mut stdin = Some(BufReader::new(tokio::io::stdin()).lines());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                ctx.shutdown();
                break;
            }
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *states.borrow_and_update();
                if state == PollState::Idle {
                    render(&ctx, &filter, &mut tracker);
                }
            }
            line = next_line(&mut stdin) => match line {
                Some(line) if line.trim() == "r" => {
                    println!("{}", color::muted("Refreshing..."));
                    ctx.force_refresh();
                }
                Some(_) => {}
                // stdin closed; keep polling without the refresh key
                None => stdin = None,
            },
        }
    }

    if let Err(e) = poller.await {
        warn!(event = "cli.watch.poller_join_failed", error = %e);
    }
}

async fn next_line(
    stdin: &mut Option<tokio::io::Lines<BufReader<tokio::io::Stdin>>>,
) -> Option<String> {
    match stdin {
        Some(lines) => lines.next_line().await.ok().flatten(),
        None => std::future::pending().await,
    }
}

fn render(ctx: &Context, filter: &DashboardFilter, tracker: &mut StatusTracker) {
    let transitions = ctx
        .cached_list()
        .map(|page| tracker.observe(&page.agents))
        .unwrap_or_default();

    if std::io::stdout().is_terminal() {
        // Clear screen and home the cursor.
        print!("\x1B[2J\x1B[H");
    }

    let dashboard = ctx.dashboard(filter);
    println!(
        "{} {}",
        color::bold("agentboard"),
        color::muted(&format!(
            "· {} · updated {} · r+Enter to refresh, Ctrl-C to quit",
            ctx.config().relay.base_url(),
            chrono::Local::now().format("%H:%M:%S")
        ))
    );
    if let Some(e) = ctx.list_error() {
        println!(
            "{}",
            color::copper(&format!("⚠ {} (showing last known list)", e))
        );
    }
    print_dashboard(&dashboard);

    let progress = ctx.batch_progress();
    if progress.total > 0 && !progress.is_complete() {
        println!("{}", color::muted(&format!("Last batch: {} fetched", progress)));
    }

    for transition in &transitions {
        println!("{}", transition_line(transition));
        info!(
            event = "cli.watch.transition_observed",
            agent_id = %transition.agent_id,
            to = %transition.to
        );
    }
}

fn transition_line(transition: &StatusTransition) -> String {
    let text = format!("{}: {}", transition.headline(), transition.body());
    match transition.kind {
        TransitionKind::Finished => color::aurora(&format!("✅ {}", text)),
        TransitionKind::Errored => color::ember(&format!("❌ {}", text)),
    }
}

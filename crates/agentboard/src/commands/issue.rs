use clap::ArgMatches;
use tracing::{error, info};

use agentboard_core::NewIssue;
use agentboard_core::view::repositories;

use super::helpers;
use crate::color;

pub(crate) fn handle_issue_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("create", sub)) => handle_issue_create(sub),
        Some(("repos", sub)) => handle_issue_repos(sub),
        _ => Err("Unknown issue subcommand".into()),
    }
}

fn handle_issue_create(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let repo = matches
        .get_one::<String>("repo")
        .ok_or("Repository argument is required")?;
    let title = matches
        .get_one::<String>("title")
        .ok_or("Title argument is required")?;
    let issue = NewIssue {
        repo: repo.clone(),
        title: title.clone(),
        description: matches.get_one::<String>("description").cloned().unwrap_or_default(),
        assign_to_agent: matches.get_flag("assign"),
    };
    let config = helpers::load_config_with_warning(matches)?;

    info!(
        event = "cli.issue.create_started",
        repo = repo,
        assign = issue.assign_to_agent
    );

    let ctx = helpers::open_context(config)?;
    let runtime = helpers::runtime()?;
    let cancel = ctx.shutdown_token();
    match runtime.block_on(ctx.executor().create_issue(&issue, &cancel)) {
        Ok(created) => {
            println!("✅ Created issue #{}: {}", created.number, color::ice(&created.url));
            if issue.assign_to_agent {
                println!("   {}", color::muted("An agent will pick it up shortly."));
            }
            info!(
                event = "cli.issue.create_completed",
                repo = repo,
                number = created.number
            );
            Ok(())
        }
        Err(e) => {
            helpers::report_fetch_error("Failed to create issue", &e);
            error!(event = "cli.issue.create_failed", repo = repo, error = %e);
            Err(e.into())
        }
    }
}

fn handle_issue_repos(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let config = helpers::load_config_with_warning(matches)?;
    let max_pages = config.sync.max_pages();

    info!(event = "cli.issue.repos_started");

    let ctx = helpers::open_context(config)?;
    let runtime = helpers::runtime()?;
    let cancel = ctx.shutdown_token();
    let result = runtime.block_on(ctx.executor().fetch_agent_list(max_pages, &cancel));
    ctx.shutdown();

    match result {
        Ok(page) => {
            let repos = repositories(&page.agents);
            if repos.is_empty() {
                println!("No repositories found.");
            }
            for repo in &repos {
                println!("{}", repo);
            }
            info!(event = "cli.issue.repos_completed", count = repos.len());
            Ok(())
        }
        Err(e) => {
            helpers::report_fetch_error("Failed to list repositories", &e);
            error!(event = "cli.issue.repos_failed", error = %e);
            Err(e.into())
        }
    }
}

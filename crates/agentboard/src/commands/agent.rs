use clap::ArgMatches;
use serde::Serialize;
use tracing::{error, info};

use agentboard_core::resources::{Message, MessageRole};
use agentboard_core::view::agent_detail_keys;
use agentboard_core::{
    Agent, BatchOutcome, Comment, FetchError, PrCommit, PrInfo, ResourceKey, ResourceKind,
    ResourceValue,
};

use super::helpers::{self, Context};
use crate::color;
use crate::table::truncate;

const PREVIEW_WIDTH: usize = 100;

#[derive(Debug, Serialize)]
struct AgentReport {
    agent: Agent,
    messages: Vec<Message>,
    pr: Option<PrInfo>,
    review_comments: Vec<Comment>,
    commits: Vec<PrCommit>,
    issue_comments: Vec<Comment>,
    /// Dependent resources that could not be loaded.
    failed: usize,
}

pub(crate) fn handle_agent_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let agent_id = matches
        .get_one::<String>("id")
        .ok_or("Agent id argument is required")?;
    let json_output = matches.get_flag("json");
    let config = helpers::load_config_with_warning(matches)?;

    info!(event = "cli.agent_started", agent_id = agent_id);

    let ctx = helpers::open_context(config)?;
    let runtime = helpers::runtime()?;

    match runtime.block_on(load_report(&ctx, agent_id)) {
        Ok(report) => {
            if json_output {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
            info!(
                event = "cli.agent_completed",
                agent_id = agent_id,
                failed = report.failed
            );
            ctx.shutdown();
            Ok(())
        }
        Err(e) => {
            helpers::report_fetch_error(&format!("Failed to load agent '{}'", agent_id), &e);
            error!(event = "cli.agent_failed", agent_id = agent_id, error = %e);
            ctx.shutdown();
            Err(e.into())
        }
    }
}

/// Fetch the agent, then everything its detail view shows as one batch.
async fn load_report(ctx: &Context, agent_id: &str) -> Result<AgentReport, FetchError> {
    let cancel = ctx.shutdown_token();
    let agent = match ctx
        .executor()
        .fetch(&ResourceKey::agent_detail(agent_id), &cancel)
        .await?
    {
        ResourceValue::Agent(agent) => agent,
        other => {
            return Err(FetchError::Malformed {
                message: format!("expected an agent, got {}", other.kind()),
            });
        }
    };

    let keys: Vec<ResourceKey> = agent_detail_keys(&agent)
        .into_iter()
        .filter(|key| key.kind() != ResourceKind::AgentDetail)
        .collect();
    let outcome: BatchOutcome = ctx.refresh_resources(keys.clone()).await;

    let mut report = AgentReport {
        agent,
        messages: Vec::new(),
        pr: None,
        review_comments: Vec::new(),
        commits: Vec::new(),
        issue_comments: Vec::new(),
        failed: outcome.failed,
    };
    for key in &keys {
        match ctx.cached_resource(key) {
            Some(ResourceValue::Conversation(conversation)) => report.messages = conversation.messages,
            Some(ResourceValue::ReviewStatus(info)) => report.pr = Some(info),
            Some(ResourceValue::ReviewComments(comments)) => report.review_comments = comments,
            Some(ResourceValue::ReviewCommits(commits)) => report.commits = commits,
            Some(ResourceValue::IssueComments(comments)) => report.issue_comments = comments,
            Some(ResourceValue::Agent(_) | ResourceValue::AgentList(_)) | None => {}
        }
    }
    Ok(report)
}

fn print_report(report: &AgentReport) {
    let agent = &report.agent;
    println!("{}", color::kiri(&agent.name));
    println!("   Id: {}", agent.id);
    println!(
        "   Status: {}",
        color::agent_status(agent.status, &agent.status.to_string())
    );
    println!("   Repository: {}", color::ice(&agent.source.repository));
    println!("   Branch: {}", agent.target.branch_name);
    println!("   Created: {}", agent.created_at);
    println!("   Link: {}", color::muted(&agent.target.url));
    if let Some(summary) = &agent.summary {
        println!("   Summary: {}", summary);
    }

    if let Some(url) = agent.pr_url() {
        println!();
        match &report.pr {
            Some(pr) => println!(
                "{} #{} {} {}",
                color::bold("Pull request"),
                pr.number,
                color::pr_status(Some(pr.status), &pr.status.to_string()),
                if pr.draft { "(draft)" } else { "" }
            ),
            None => println!("{} {}", color::bold("Pull request"), color::muted("(status unavailable)")),
        }
        println!("   {}", color::muted(url));
        if let Some(pr) = &report.pr {
            println!("   {}", pr.title);
        }
        for commit in &report.commits {
            println!(
                "   {} {}",
                color::copper(commit.short_sha()),
                truncate(commit.message.lines().next().unwrap_or(""), PREVIEW_WIDTH)
            );
        }
        print_comments("Review comments", &report.review_comments);
    }

    if agent.issue_url().is_some() {
        print_comments("Issue comments", &report.issue_comments);
    }

    if !report.messages.is_empty() {
        println!();
        println!("{} ({})", color::bold("Conversation"), report.messages.len());
        for message in &report.messages {
            let who = match message.role {
                MessageRole::UserMessage => color::ice("you"),
                MessageRole::AssistantMessage => color::kiri("agent"),
            };
            let first_line = message.text.lines().next().unwrap_or("");
            println!("   {}: {}", who, truncate(first_line, PREVIEW_WIDTH));
        }
    }

    if report.failed > 0 {
        println!();
        eprintln!(
            "{}",
            color::warning(&format!(
                "Warning: {} related resource(s) could not be loaded.",
                report.failed
            ))
        );
    }
}

fn print_comments(title: &str, comments: &[Comment]) {
    println!();
    println!("{} ({})", color::bold(title), comments.len());
    for comment in comments {
        let author = if comment.is_bot {
            color::muted(&format!("{} [bot]", comment.user))
        } else {
            color::ice(&comment.user)
        };
        let first_line = comment.body.lines().next().unwrap_or("");
        println!("   {}: {}", author, truncate(first_line, PREVIEW_WIDTH));
    }
}

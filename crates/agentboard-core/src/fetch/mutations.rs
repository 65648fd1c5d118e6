//! Write operations against the relay.
//!
//! These are pass-through: results are not cached. On success the affected
//! read slots are expired so the next poll or batch refetches them.

use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::fetch::errors::FetchError;
use crate::fetch::executor::FetchExecutor;
use crate::fetch::traits::{RelayRequest, Transport};
use crate::resources::{CreatedIssue, NewIssue, ResourceKey, parse_issue_url, parse_pr_url};

impl<T: Transport> FetchExecutor<T> {
    /// Send a follow-up instruction to a running agent.
    pub async fn send_followup(
        &self,
        agent_id: &str,
        message: &str,
        cancel: &CancellationToken,
    ) -> Result<(), FetchError> {
        if agent_id.trim().is_empty() {
            return Err(invalid("agent id must not be empty"));
        }
        let message = non_empty(message, "follow-up message must not be empty")?;

        let request = RelayRequest::post(
            format!("/api/agents/{}/followup", urlencoding::encode(agent_id)),
            json!({ "message": message }),
        );
        self.transport.send(request, cancel.clone()).await?;

        self.cache.expire(&ResourceKey::agent_conversation(agent_id));
        self.cache.expire(&ResourceKey::agent_detail(agent_id));
        self.cache.expire(&ResourceKey::agent_list());
        info!(event = "core.mutation.followup_completed", agent_id = %agent_id);
        Ok(())
    }

    /// Post a comment on a pull request thread.
    pub async fn comment_on_review(
        &self,
        pr_url: &str,
        body: &str,
        cancel: &CancellationToken,
    ) -> Result<(), FetchError> {
        require_pr_url(pr_url)?;
        let body = non_empty(body, "comment must not be empty")?;

        let request = RelayRequest::post("/api/pr-comment", json!({ "prUrl": pr_url, "comment": body }));
        self.transport.send(request, cancel.clone()).await?;

        self.cache.expire(&ResourceKey::review_comments(pr_url));
        info!(event = "core.mutation.review_comment_completed", pr_url = %pr_url);
        Ok(())
    }

    /// Post a comment on an issue thread.
    pub async fn comment_on_issue(
        &self,
        issue_url: &str,
        body: &str,
        cancel: &CancellationToken,
    ) -> Result<(), FetchError> {
        if parse_issue_url(issue_url).is_none() {
            return Err(invalid(&format!("'{}' is not a GitHub issue URL", issue_url)));
        }
        let body = non_empty(body, "comment must not be empty")?;

        let request = RelayRequest::post(
            "/api/issue-comment",
            json!({ "issueUrl": issue_url, "comment": body }),
        );
        self.transport.send(request, cancel.clone()).await?;

        self.cache.expire(&ResourceKey::issue_comments(issue_url));
        info!(event = "core.mutation.issue_comment_completed", issue_url = %issue_url);
        Ok(())
    }

    /// Open a GitHub issue, optionally assigning it to a new agent.
    ///
    /// Returns the issue the relay created. An assigned issue starts an agent,
    /// so the agent list is expired.
    pub async fn create_issue(&self, issue: &NewIssue, cancel: &CancellationToken) -> Result<CreatedIssue, FetchError> {
        let repo = non_empty(&issue.repo, "repository and title are required")?;
        let title = non_empty(&issue.title, "repository and title are required")?;

        let request = RelayRequest::post(
            "/api/issues",
            json!({
                "repo": repo,
                "title": title,
                "description": issue.description.trim(),
                "assignToCursor": issue.assign_to_agent,
            }),
        );
        let payload = self.transport.send(request, cancel.clone()).await?;
        let created: CreatedIssue = serde_json::from_value(payload).map_err(|e| FetchError::Malformed {
            message: format!("created issue: {}", e),
        })?;

        if issue.assign_to_agent {
            self.cache.expire(&ResourceKey::agent_list());
        }
        info!(
            event = "core.mutation.create_issue_completed",
            repo = %repo,
            number = created.number,
            assigned = issue.assign_to_agent
        );
        Ok(created)
    }

    /// Flip a draft pull request to ready for review.
    pub async fn mark_ready_for_review(&self, pr_url: &str, cancel: &CancellationToken) -> Result<(), FetchError> {
        require_pr_url(pr_url)?;

        let request = RelayRequest::post("/api/pr-ready", json!({ "prUrl": pr_url }));
        self.transport.send(request, cancel.clone()).await?;

        self.cache.expire(&ResourceKey::review_status(pr_url));
        info!(event = "core.mutation.mark_ready_completed", pr_url = %pr_url);
        Ok(())
    }
}

fn require_pr_url(pr_url: &str) -> Result<(), FetchError> {
    if parse_pr_url(pr_url).is_none() {
        return Err(invalid(&format!("'{}' is not a GitHub pull request URL", pr_url)));
    }
    Ok(())
}

fn non_empty<'a>(text: &'a str, message: &str) -> Result<&'a str, FetchError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(invalid(message));
    }
    Ok(trimmed)
}

fn invalid(message: &str) -> FetchError {
    FetchError::InvalidRequest {
        message: message.to_string(),
    }
}

//! Payload types returned by the relay, in their wire (camelCase) shape.

use serde::{Deserialize, Serialize};

/// Lifecycle of a coding agent on the agent service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentStatus {
    Creating,
    Running,
    Finished,
    Stopped,
    Error,
    Expired,
}

impl AgentStatus {
    /// Still doing work; the agent may change on the next poll.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Creating | Self::Running)
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Creating => write!(f, "CREATING"),
            Self::Running => write!(f, "RUNNING"),
            Self::Finished => write!(f, "FINISHED"),
            Self::Stopped => write!(f, "STOPPED"),
            Self::Error => write!(f, "ERROR"),
            Self::Expired => write!(f, "EXPIRED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSource {
    pub repository: String,
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentTarget {
    pub branch_name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_url: Option<String>,
    #[serde(default)]
    pub auto_create_pr: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub status: AgentStatus,
    pub source: AgentSource,
    pub target: AgentTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub created_at: String,
}

impl Agent {
    pub fn pr_url(&self) -> Option<&str> {
        self.target.pr_url.as_deref().filter(|url| !url.is_empty())
    }

    pub fn issue_url(&self) -> Option<&str> {
        self.source.issue_url.as_deref().filter(|url| !url.is_empty())
    }
}

/// One page of the agent list. Older relays name the array `items`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentsPage {
    #[serde(alias = "items")]
    pub agents: Vec<Agent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    UserMessage,
    AssistantMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(rename = "type")]
    pub role: MessageRole,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub messages: Vec<Message>,
}

/// Review state of a pull request. Merged and closed never change again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrStatus {
    Open,
    Merged,
    Closed,
}

impl PrStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Merged | Self::Closed)
    }
}

impl std::fmt::Display for PrStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Merged => write!(f, "merged"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrInfo {
    pub status: PrStatus,
    pub title: String,
    pub number: u64,
    pub updated_at: String,
    #[serde(default)]
    pub draft: bool,
}

impl PrInfo {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reactions {
    #[serde(default, rename = "+1")]
    pub plus_one: u32,
    #[serde(default, rename = "-1")]
    pub minus_one: u32,
    #[serde(default)]
    pub laugh: u32,
    #[serde(default)]
    pub hooray: u32,
    #[serde(default)]
    pub confused: u32,
    #[serde(default)]
    pub heart: u32,
    #[serde(default)]
    pub rocket: u32,
    #[serde(default)]
    pub eyes: u32,
}

impl Reactions {
    pub fn total(&self) -> u32 {
        self.plus_one
            + self.minus_one
            + self.laugh
            + self.hooray
            + self.confused
            + self.heart
            + self.rocket
            + self.eyes
    }
}

/// A comment on a pull request or issue thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u64,
    pub user: String,
    pub body: String,
    pub created_at: String,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub reactions: Reactions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrCommit {
    pub sha: String,
    pub message: String,
    pub author: String,
    #[serde(default)]
    pub date: String,
    pub url: String,
}

impl PrCommit {
    pub fn short_sha(&self) -> &str {
        self.sha.get(..7).unwrap_or(&self.sha)
    }
}

/// Fields for opening a new issue through the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    /// `owner/repo`, optionally prefixed with `github.com/`.
    pub repo: String,
    pub title: String,
    pub description: String,
    /// Ask the relay to hand the issue to a new agent.
    pub assign_to_agent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedIssue {
    pub url: String,
    pub number: u64,
}

/// Wire envelopes for the list endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct CommentsEnvelope {
    pub comments: Vec<Comment>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitsEnvelope {
    pub commits: Vec<PrCommit>,
}

/// Owner, repository and number parsed out of a GitHub pull request or issue URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

/// Parse `https://github.com/<owner>/<repo>/pull/<n>`.
pub fn parse_pr_url(url: &str) -> Option<ThreadRef> {
    parse_thread_url(url, "pull")
}

/// Parse `https://github.com/<owner>/<repo>/issues/<n>`.
pub fn parse_issue_url(url: &str) -> Option<ThreadRef> {
    parse_thread_url(url, "issues")
}

fn parse_thread_url(url: &str, segment: &str) -> Option<ThreadRef> {
    let (_, rest) = url.split_once("github.com/")?;
    let mut parts = rest.split('/');
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let repo = parts.next().filter(|s| !s.is_empty())?;
    if parts.next()? != segment {
        return None;
    }
    let digits: String = parts
        .next()?
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let number = digits.parse().ok()?;
    Some(ThreadRef {
        owner: owner.to_string(),
        repo: repo.to_string(),
        number,
    })
}

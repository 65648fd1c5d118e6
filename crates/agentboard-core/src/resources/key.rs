//! Resource keys: the (kind, id) pair that names one cache slot.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Every kind of remote resource the board synchronizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    AgentList,
    AgentDetail,
    AgentConversation,
    ReviewStatus,
    ReviewComments,
    ReviewCommits,
    IssueComments,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::AgentList,
        ResourceKind::AgentDetail,
        ResourceKind::AgentConversation,
        ResourceKind::ReviewStatus,
        ResourceKind::ReviewComments,
        ResourceKind::ReviewCommits,
        ResourceKind::IssueComments,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AgentList => "agent-list",
            Self::AgentDetail => "agent-detail",
            Self::AgentConversation => "agent-conversation",
            Self::ReviewStatus => "review-status",
            Self::ReviewComments => "review-comments",
            Self::ReviewCommits => "review-commits",
            Self::IssueComments => "issue-comments",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyParseError {
    #[error("unknown resource kind '{kind}'")]
    UnknownKind { kind: String },

    #[error("resource key '{key}' is missing the ':' separator")]
    MissingSeparator { key: String },
}

impl FromStr for ResourceKind {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| KeyParseError::UnknownKind {
                kind: s.to_string(),
            })
    }
}

/// Names one cache slot. Equal keys always denote the same slot.
///
/// The string form is `<kind>:<id>`. Ids may themselves contain `:` (URLs do),
/// so parsing splits on the first separator only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    kind: ResourceKind,
    id: String,
}

impl ResourceKey {
    pub fn new(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn agent_list() -> Self {
        Self::new(ResourceKind::AgentList, "")
    }

    pub fn agent_detail(agent_id: impl Into<String>) -> Self {
        Self::new(ResourceKind::AgentDetail, agent_id)
    }

    pub fn agent_conversation(agent_id: impl Into<String>) -> Self {
        Self::new(ResourceKind::AgentConversation, agent_id)
    }

    pub fn review_status(pr_url: impl Into<String>) -> Self {
        Self::new(ResourceKind::ReviewStatus, pr_url)
    }

    pub fn review_comments(pr_url: impl Into<String>) -> Self {
        Self::new(ResourceKind::ReviewComments, pr_url)
    }

    pub fn review_commits(pr_url: impl Into<String>) -> Self {
        Self::new(ResourceKind::ReviewCommits, pr_url)
    }

    pub fn issue_comments(issue_url: impl Into<String>) -> Self {
        Self::new(ResourceKind::IssueComments, issue_url)
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

impl FromStr for ResourceKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| KeyParseError::MissingSeparator { key: s.to_string() })?;
        Ok(Self::new(kind.parse()?, id))
    }
}

impl Serialize for ResourceKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

use serde::{Deserialize, Serialize};

use super::key::ResourceKind;
use super::types::{
    Agent, AgentsPage, Comment, CommentsEnvelope, CommitsEnvelope, Conversation, PrCommit, PrInfo,
};

/// A decoded resource, one variant per [`ResourceKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum ResourceValue {
    AgentList(AgentsPage),
    Agent(Agent),
    Conversation(Conversation),
    ReviewStatus(PrInfo),
    ReviewComments(Vec<Comment>),
    ReviewCommits(Vec<PrCommit>),
    IssueComments(Vec<Comment>),
}

impl ResourceValue {
    /// Decode a relay payload into the variant for `kind`.
    pub fn decode(kind: ResourceKind, payload: serde_json::Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            ResourceKind::AgentList => Self::AgentList(serde_json::from_value(payload)?),
            ResourceKind::AgentDetail => Self::Agent(serde_json::from_value(payload)?),
            ResourceKind::AgentConversation => Self::Conversation(serde_json::from_value(payload)?),
            ResourceKind::ReviewStatus => Self::ReviewStatus(serde_json::from_value(payload)?),
            ResourceKind::ReviewComments => {
                let envelope: CommentsEnvelope = serde_json::from_value(payload)?;
                Self::ReviewComments(envelope.comments)
            }
            ResourceKind::ReviewCommits => {
                let envelope: CommitsEnvelope = serde_json::from_value(payload)?;
                Self::ReviewCommits(envelope.commits)
            }
            ResourceKind::IssueComments => {
                let envelope: CommentsEnvelope = serde_json::from_value(payload)?;
                Self::IssueComments(envelope.comments)
            }
        })
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::AgentList(_) => ResourceKind::AgentList,
            Self::Agent(_) => ResourceKind::AgentDetail,
            Self::Conversation(_) => ResourceKind::AgentConversation,
            Self::ReviewStatus(_) => ResourceKind::ReviewStatus,
            Self::ReviewComments(_) => ResourceKind::ReviewComments,
            Self::ReviewCommits(_) => ResourceKind::ReviewCommits,
            Self::IssueComments(_) => ResourceKind::IssueComments,
        }
    }

    /// A merged or closed review status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ReviewStatus(info) if info.is_terminal())
    }

    pub fn as_agent_list(&self) -> Option<&AgentsPage> {
        match self {
            Self::AgentList(page) => Some(page),
            _ => None,
        }
    }

    pub fn as_review_status(&self) -> Option<&PrInfo> {
        match self {
            Self::ReviewStatus(info) => Some(info),
            _ => None,
        }
    }

    /// Comments for either a review or an issue thread.
    pub fn as_comments(&self) -> Option<&[Comment]> {
        match self {
            Self::ReviewComments(comments) | Self::IssueComments(comments) => Some(comments),
            _ => None,
        }
    }
}

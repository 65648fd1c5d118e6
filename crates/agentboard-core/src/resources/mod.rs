//! Resource identity and payload types.

pub mod key;
pub mod types;
pub mod value;

pub use key::{KeyParseError, ResourceKey, ResourceKind};
pub use types::{
    Agent, AgentSource, AgentStatus, AgentTarget, AgentsPage, Comment, Conversation, CreatedIssue,
    Message, MessageRole, NewIssue, PrCommit, PrInfo, PrStatus, Reactions, ThreadRef, parse_issue_url, parse_pr_url,
};
pub use value::ResourceValue;

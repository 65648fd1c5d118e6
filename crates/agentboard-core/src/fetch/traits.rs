//! The transport seam between the sync core and the relay.

use std::future::Future;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::fetch::errors::FetchError;
use crate::resources::{ResourceKey, ResourceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// One request against a relay route, independent of the HTTP client.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RelayRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn with_query(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query.push((name.to_string(), value.into()));
        self
    }

    /// The read request that fills the slot named by `key`.
    ///
    /// `cursor` only applies to the agent list.
    pub fn for_key(key: &ResourceKey, cursor: Option<&str>) -> Self {
        match key.kind() {
            ResourceKind::AgentList => {
                let request = Self::get("/api/agents");
                match cursor {
                    Some(cursor) => request.with_query("cursor", cursor),
                    None => request,
                }
            }
            ResourceKind::AgentDetail => {
                Self::get(format!("/api/agents/{}", urlencoding::encode(key.id())))
            }
            ResourceKind::AgentConversation => Self::get(format!(
                "/api/agents/{}/conversation",
                urlencoding::encode(key.id())
            )),
            ResourceKind::ReviewStatus => Self::get("/api/pr-status").with_query("url", key.id()),
            ResourceKind::ReviewComments => {
                Self::get("/api/pr-comments").with_query("url", key.id())
            }
            ResourceKind::ReviewCommits => Self::get("/api/pr-commits").with_query("url", key.id()),
            ResourceKind::IssueComments => {
                Self::get("/api/issue-comments").with_query("url", key.id())
            }
        }
    }

    /// Path plus percent-encoded query string.
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query: Vec<String> = self
            .query
            .iter()
            .map(|(name, value)| format!("{}={}", urlencoding::encode(name), urlencoding::encode(value)))
            .collect();
        format!("{}?{}", self.path, query.join("&"))
    }

    /// `METHOD path?query` with the query left readable. Used in logs.
    pub fn route(&self) -> String {
        let mut route = format!("{} {}", self.method, self.path);
        for (i, (name, value)) in self.query.iter().enumerate() {
            route.push(if i == 0 { '?' } else { '&' });
            route.push_str(name);
            route.push('=');
            route.push_str(value);
        }
        route
    }
}

/// Sends relay requests and returns the decoded JSON body.
///
/// Implementations must abandon the request and return
/// [`FetchError::Cancelled`] once `cancel` fires, and must map non-2xx
/// responses to [`FetchError::Upstream`].
pub trait Transport: Send + Sync + 'static {
    fn send(
        &self,
        request: RelayRequest,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<Value, FetchError>> + Send;
}

//! Configuration types.
//!
//! Every leaf field is optional so that a partial file only overrides what it
//! names. Accessor methods resolve the built-in defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::defaults::*;

/// Root configuration, as read from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub relay: RelayConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub freshness: FreshnessConfig,

    #[serde(default)]
    pub view: ViewConfig,
}

/// Where the relay endpoints live.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    pub base_url: Option<String>,
}

impl RelayConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_RELAY_URL)
    }

    pub fn merge(base: &Self, override_config: &Self) -> Self {
        Self {
            base_url: override_config
                .base_url
                .clone()
                .or_else(|| base.base_url.clone()),
        }
    }
}

/// Polling and batching knobs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    pub poll_interval_secs: Option<u64>,
    pub window_size: Option<usize>,
    pub fetch_timeout_secs: Option<u64>,
    pub max_pages: Option<usize>,
}

impl SyncConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(
            self.poll_interval_secs
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
        )
    }

    pub fn window_size(&self) -> usize {
        self.window_size.unwrap_or(DEFAULT_WINDOW_SIZE)
    }

    /// Deadline for a single relay request.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(
            self.fetch_timeout_secs
                .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS),
        )
    }

    /// Upper bound on agent-list pages followed per poll.
    pub fn max_pages(&self) -> usize {
        self.max_pages.unwrap_or(DEFAULT_MAX_PAGES)
    }

    pub fn merge(base: &Self, override_config: &Self) -> Self {
        Self {
            poll_interval_secs: override_config
                .poll_interval_secs
                .or(base.poll_interval_secs),
            window_size: override_config.window_size.or(base.window_size),
            fetch_timeout_secs: override_config
                .fetch_timeout_secs
                .or(base.fetch_timeout_secs),
            max_pages: override_config.max_pages.or(base.max_pages),
        }
    }
}

/// How long each resource kind stays fresh after a successful fetch, in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FreshnessConfig {
    pub agent_detail: Option<u64>,
    pub agent_conversation: Option<u64>,
    pub review_status: Option<u64>,
    pub review_comments: Option<u64>,
    pub review_commits: Option<u64>,
    pub issue_comments: Option<u64>,
}

impl FreshnessConfig {
    pub fn agent_detail(&self) -> Duration {
        secs(self.agent_detail, DEFAULT_AGENT_DETAIL_FRESH_SECS)
    }

    pub fn agent_conversation(&self) -> Duration {
        secs(
            self.agent_conversation,
            DEFAULT_AGENT_CONVERSATION_FRESH_SECS,
        )
    }

    pub fn review_status(&self) -> Duration {
        secs(self.review_status, DEFAULT_REVIEW_STATUS_FRESH_SECS)
    }

    pub fn review_comments(&self) -> Duration {
        secs(self.review_comments, DEFAULT_REVIEW_COMMENTS_FRESH_SECS)
    }

    pub fn review_commits(&self) -> Duration {
        secs(self.review_commits, DEFAULT_REVIEW_COMMITS_FRESH_SECS)
    }

    pub fn issue_comments(&self) -> Duration {
        secs(self.issue_comments, DEFAULT_ISSUE_COMMENTS_FRESH_SECS)
    }

    pub fn merge(base: &Self, override_config: &Self) -> Self {
        Self {
            agent_detail: override_config.agent_detail.or(base.agent_detail),
            agent_conversation: override_config
                .agent_conversation
                .or(base.agent_conversation),
            review_status: override_config.review_status.or(base.review_status),
            review_comments: override_config.review_comments.or(base.review_comments),
            review_commits: override_config.review_commits.or(base.review_commits),
            issue_comments: override_config.issue_comments.or(base.issue_comments),
        }
    }
}

/// Dashboard filtering defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    pub hide_expired: Option<bool>,
    pub show_closed: Option<bool>,
}

impl ViewConfig {
    pub fn hide_expired(&self) -> bool {
        self.hide_expired.unwrap_or(DEFAULT_HIDE_EXPIRED)
    }

    /// Whether agents whose PR is merged or closed stay visible.
    pub fn show_closed(&self) -> bool {
        self.show_closed.unwrap_or(DEFAULT_SHOW_CLOSED)
    }

    pub fn merge(base: &Self, override_config: &Self) -> Self {
        Self {
            hide_expired: override_config.hide_expired.or(base.hide_expired),
            show_closed: override_config.show_closed.or(base.show_closed),
        }
    }
}

fn secs(value: Option<u64>, default: u64) -> Duration {
    Duration::from_secs(value.unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let config: BoardConfig = toml::from_str("").unwrap();
        assert_eq!(config.relay.base_url(), "http://localhost:3000");
        assert_eq!(config.sync.poll_interval(), Duration::from_secs(10));
        assert_eq!(config.sync.window_size(), 8);
        assert_eq!(config.sync.fetch_timeout(), Duration::from_secs(15));
        assert_eq!(config.sync.max_pages(), 5);
        assert_eq!(config.freshness.review_status(), Duration::from_secs(60));
        assert_eq!(
            config.freshness.agent_conversation(),
            Duration::from_secs(300)
        );
        assert_eq!(config.freshness.agent_detail(), Duration::ZERO);
        assert!(config.view.hide_expired());
        assert!(!config.view.show_closed());
    }

    #[test]
    fn test_partial_sections_parse() {
        let config: BoardConfig = toml::from_str(
            r#"
[sync]
window_size = 4

[freshness]
review_comments = 120
"#,
        )
        .unwrap();
        assert_eq!(config.sync.window_size(), 4);
        assert_eq!(config.sync.poll_interval(), Duration::from_secs(10));
        assert_eq!(
            config.freshness.review_comments(),
            Duration::from_secs(120)
        );
        assert_eq!(config.freshness.review_commits(), Duration::from_secs(60));
    }

    #[test]
    fn test_sync_merge_override_wins() {
        let base = SyncConfig {
            poll_interval_secs: Some(30),
            window_size: Some(2),
            fetch_timeout_secs: None,
            max_pages: Some(1),
        };
        let over = SyncConfig {
            poll_interval_secs: None,
            window_size: Some(16),
            fetch_timeout_secs: Some(5),
            max_pages: None,
        };
        let merged = SyncConfig::merge(&base, &over);
        assert_eq!(merged.poll_interval_secs, Some(30));
        assert_eq!(merged.window_size, Some(16));
        assert_eq!(merged.fetch_timeout_secs, Some(5));
        assert_eq!(merged.max_pages, Some(1));
    }

    #[test]
    fn test_view_merge_keeps_base_when_unset() {
        let base = ViewConfig {
            hide_expired: Some(false),
            show_closed: None,
        };
        let merged = ViewConfig::merge(&base, &ViewConfig::default());
        assert!(!merged.hide_expired());
        assert!(!merged.show_closed());
    }
}

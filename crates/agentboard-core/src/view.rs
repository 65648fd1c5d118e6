//! Derived dashboard state: which agents are shown, in what order, and which
//! dependent resources the poller should keep fresh.

use std::collections::{BTreeSet, HashSet};

use agentboard_config::ViewConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::ResourceCache;
use crate::resources::{Agent, AgentStatus, AgentsPage, PrInfo, PrStatus, ResourceKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardFilter {
    pub hide_expired: bool,
    /// Keep agents whose PR is merged or closed.
    pub show_closed: bool,
}

impl Default for DashboardFilter {
    fn default() -> Self {
        Self::from(&ViewConfig::default())
    }
}

impl From<&ViewConfig> for DashboardFilter {
    fn from(config: &ViewConfig) -> Self {
        Self {
            hide_expired: config.hide_expired(),
            show_closed: config.show_closed(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardRow {
    pub agent: Agent,
    pub pr: Option<PrInfo>,
    pub comment_count: Option<usize>,
    pub last_activity: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dashboard {
    pub rows: Vec<DashboardRow>,
    /// Agents filtered out of `rows`.
    pub hidden: usize,
}

/// Filter and order the agent list against what the cache knows.
///
/// Rows sort by most recent activity first: the PR's `updatedAt` when its
/// status is known, otherwise the agent's `createdAt`. Rows without a parsable
/// timestamp go last.
pub fn build_dashboard(page: &AgentsPage, cache: &ResourceCache, filter: &DashboardFilter) -> Dashboard {
    let mut dashboard = Dashboard::default();

    for agent in &page.agents {
        let pr = agent.pr_url().and_then(|url| {
            cache
                .value(&ResourceKey::review_status(url))
                .and_then(|value| value.as_review_status().cloned())
        });

        if filter.hide_expired && agent.status == AgentStatus::Expired {
            dashboard.hidden += 1;
            continue;
        }
        if !filter.show_closed && pr.as_ref().is_some_and(|info| info.status != PrStatus::Open) {
            dashboard.hidden += 1;
            continue;
        }

        let comment_count = agent.pr_url().and_then(|url| {
            cache
                .value(&ResourceKey::review_comments(url))
                .and_then(|value| value.as_comments().map(<[_]>::len))
        });
        let last_activity = pr
            .as_ref()
            .and_then(|info| parse_timestamp(&info.updated_at))
            .or_else(|| parse_timestamp(&agent.created_at));

        dashboard.rows.push(DashboardRow {
            agent: agent.clone(),
            pr,
            comment_count,
            last_activity,
        });
    }

    // Stable sort keeps list order among equal timestamps.
    dashboard
        .rows
        .sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
    dashboard
}

/// Review-status keys for every agent with a PR, de-duplicated in list order.
pub fn review_status_keys(agents: &[Agent]) -> Vec<ResourceKey> {
    let mut seen = HashSet::new();
    agents
        .iter()
        .filter_map(Agent::pr_url)
        .filter(|url| seen.insert(*url))
        .map(ResourceKey::review_status)
        .collect()
}

/// Review-comments keys for visible agents whose PR is known to be open.
///
/// Agents the filter hides (expired ones when `hide_expired` is set) get no
/// comment polling.
pub fn open_review_comment_keys(
    agents: &[Agent],
    cache: &ResourceCache,
    filter: &DashboardFilter,
) -> Vec<ResourceKey> {
    let mut seen = HashSet::new();
    agents
        .iter()
        .filter(|agent| !(filter.hide_expired && agent.status == AgentStatus::Expired))
        .filter_map(Agent::pr_url)
        .filter(|url| {
            cache
                .value(&ResourceKey::review_status(*url))
                .and_then(|value| value.as_review_status().map(|info| info.status == PrStatus::Open))
                .unwrap_or(false)
        })
        .filter(|url| seen.insert(*url))
        .map(ResourceKey::review_comments)
        .collect()
}

/// Distinct source repositories across the list, sorted.
pub fn repositories(agents: &[Agent]) -> Vec<String> {
    agents
        .iter()
        .map(|agent| agent.source.repository.trim())
        .filter(|repo| !repo.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Every key the agent detail screen shows, for one batch refresh.
pub fn agent_detail_keys(agent: &Agent) -> Vec<ResourceKey> {
    let mut keys = vec![
        ResourceKey::agent_detail(&agent.id),
        ResourceKey::agent_conversation(&agent.id),
    ];
    if let Some(url) = agent.pr_url() {
        keys.push(ResourceKey::review_status(url));
        keys.push(ResourceKey::review_comments(url));
        keys.push(ResourceKey::review_commits(url));
    }
    if let Some(url) = agent.issue_url() {
        keys.push(ResourceKey::issue_comments(url));
    }
    keys
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

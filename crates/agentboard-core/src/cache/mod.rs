//! In-memory resource cache.
//!
//! Maps a [`ResourceKey`] to the last successfully fetched value plus the
//! instant it was fetched. Every mutation is a short critical section behind a
//! `std::sync::RwLock` and never spans an `.await`. The cache knows nothing
//! about the network.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use agentboard_config::FreshnessConfig;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::debug;

use crate::resources::{AgentsPage, ResourceKey, ResourceKind, ResourceValue};

const EVENT_CAPACITY: usize = 256;

/// Per-kind fresh windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreshnessPolicy {
    agent_list: Duration,
    agent_detail: Duration,
    agent_conversation: Duration,
    review_status: Duration,
    review_comments: Duration,
    review_commits: Duration,
    issue_comments: Duration,
}

impl FreshnessPolicy {
    pub fn from_config(config: &FreshnessConfig) -> Self {
        Self {
            // The list is refreshed on every poll tick, never skipped.
            agent_list: Duration::ZERO,
            agent_detail: config.agent_detail(),
            agent_conversation: config.agent_conversation(),
            review_status: config.review_status(),
            review_comments: config.review_comments(),
            review_commits: config.review_commits(),
            issue_comments: config.issue_comments(),
        }
    }

    /// Same window for every kind except the agent list. Handy in tests.
    pub fn uniform(fresh_for: Duration) -> Self {
        Self {
            agent_list: Duration::ZERO,
            agent_detail: fresh_for,
            agent_conversation: fresh_for,
            review_status: fresh_for,
            review_comments: fresh_for,
            review_commits: fresh_for,
            issue_comments: fresh_for,
        }
    }

    pub fn fresh_for(&self, kind: ResourceKind) -> Duration {
        match kind {
            ResourceKind::AgentList => self.agent_list,
            ResourceKind::AgentDetail => self.agent_detail,
            ResourceKind::AgentConversation => self.agent_conversation,
            ResourceKind::ReviewStatus => self.review_status,
            ResourceKind::ReviewComments => self.review_comments,
            ResourceKind::ReviewCommits => self.review_commits,
            ResourceKind::IssueComments => self.issue_comments,
        }
    }
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self::from_config(&FreshnessConfig::default())
    }
}

/// One cached value.
///
/// `fresh_for == None` marks an entry seeded from the terminal store: it never
/// goes stale.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub value: ResourceValue,
    pub fetched_at: Instant,
    pub fresh_for: Option<Duration>,
}

impl CacheEntry {
    pub fn is_fresh_at(&self, now: Instant) -> bool {
        match self.fresh_for {
            None => true,
            Some(window) => now.saturating_duration_since(self.fetched_at) < window,
        }
    }

    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Instant::now())
    }

    pub fn is_pinned(&self) -> bool {
        self.fresh_for.is_none()
    }

    pub fn age(&self) -> Duration {
        Instant::now().saturating_duration_since(self.fetched_at)
    }
}

/// Change notification for renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    Updated(ResourceKey),
    Removed(ResourceKey),
}

#[derive(Debug)]
pub struct ResourceCache {
    entries: RwLock<HashMap<ResourceKey, CacheEntry>>,
    policy: FreshnessPolicy,
    events: broadcast::Sender<CacheEvent>,
}

impl ResourceCache {
    pub fn new(policy: FreshnessPolicy) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: RwLock::new(HashMap::new()),
            policy,
            events,
        }
    }

    pub fn policy(&self) -> &FreshnessPolicy {
        &self.policy
    }

    pub fn get(&self, key: &ResourceKey) -> Option<CacheEntry> {
        self.read().get(key).cloned()
    }

    pub fn value(&self, key: &ResourceKey) -> Option<ResourceValue> {
        self.read().get(key).map(|entry| entry.value.clone())
    }

    /// The cached agent list, fresh or stale.
    pub fn agent_list(&self) -> Option<AgentsPage> {
        self.read()
            .get(&ResourceKey::agent_list())
            .and_then(|entry| entry.value.as_agent_list().cloned())
    }

    /// Overwrite the slot, stamping now and the kind's fresh window.
    pub fn set(&self, key: ResourceKey, value: ResourceValue) {
        let fresh_for = self.policy.fresh_for(key.kind());
        self.insert(
            key,
            CacheEntry {
                value,
                fetched_at: Instant::now(),
                fresh_for: Some(fresh_for),
            },
        );
    }

    /// Insert a value that never goes stale.
    pub fn seed_terminal(&self, key: ResourceKey, value: ResourceValue) {
        self.insert(
            key,
            CacheEntry {
                value,
                fetched_at: Instant::now(),
                fresh_for: None,
            },
        );
    }

    fn insert(&self, key: ResourceKey, entry: CacheEntry) {
        self.write().insert(key.clone(), entry);
        debug!(event = "core.cache.set_completed", key = %key);
        let _ = self.events.send(CacheEvent::Updated(key));
    }

    /// Entry exists and is younger than `fresh_for`. Pinned entries are always fresh.
    pub fn is_fresh(&self, key: &ResourceKey, fresh_for: Duration) -> bool {
        let now = Instant::now();
        self.read().get(key).is_some_and(|entry| match entry.fresh_for {
            None => true,
            Some(_) => now.saturating_duration_since(entry.fetched_at) < fresh_for,
        })
    }

    /// Entry exists and is fresh by its own window.
    pub fn has_fresh(&self, key: &ResourceKey) -> bool {
        let now = Instant::now();
        self.read().get(key).is_some_and(|entry| entry.is_fresh_at(now))
    }

    /// Remove every entry of `kind`. Returns how many were removed.
    pub fn invalidate_prefix(&self, kind: ResourceKind) -> usize {
        let removed: Vec<ResourceKey> = {
            let mut entries = self.write();
            let keys: Vec<ResourceKey> = entries.keys().filter(|k| k.kind() == kind).cloned().collect();
            for key in &keys {
                entries.remove(key);
            }
            keys
        };

        debug!(
            event = "core.cache.invalidate_completed",
            kind = %kind,
            removed = removed.len()
        );
        let count = removed.len();
        for key in removed {
            let _ = self.events.send(CacheEvent::Removed(key));
        }
        count
    }

    /// Mark every non-pinned entry of `kind` stale while keeping its value
    /// servable. Returns how many entries were expired.
    pub fn expire_kind(&self, kind: ResourceKind) -> usize {
        let mut expired = 0;
        for entry in self
            .write()
            .iter_mut()
            .filter(|(k, _)| k.kind() == kind)
            .map(|(_, entry)| entry)
            .filter(|entry| !entry.is_pinned())
        {
            entry.fresh_for = Some(Duration::ZERO);
            expired += 1;
        }
        debug!(event = "core.cache.expire_completed", kind = %kind, expired = expired);
        expired
    }

    /// Mark one entry stale unless it is pinned.
    pub fn expire(&self, key: &ResourceKey) -> bool {
        match self.write().get_mut(key) {
            Some(entry) if !entry.is_pinned() => {
                entry.fresh_for = Some(Duration::ZERO);
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<ResourceKey, CacheEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<ResourceKey, CacheEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ResourceCache {
    fn default() -> Self {
        Self::new(FreshnessPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{PrInfo, PrStatus};

    fn status(status: PrStatus) -> ResourceValue {
        ResourceValue::ReviewStatus(PrInfo {
            status,
            title: "Add cache".to_string(),
            number: 7,
            updated_at: "2026-03-01T10:00:00Z".to_string(),
            draft: false,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_goes_stale_after_window() {
        let cache = ResourceCache::new(FreshnessPolicy::uniform(Duration::from_secs(60)));
        let key = ResourceKey::review_status("https://github.com/acme/app/pull/7");

        cache.set(key.clone(), status(PrStatus::Open));
        assert!(cache.has_fresh(&key));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(cache.has_fresh(&key));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!cache.has_fresh(&key));
        // Stale values stay servable.
        assert_eq!(cache.value(&key), Some(status(PrStatus::Open)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_is_fresh_uses_caller_window() {
        let cache = ResourceCache::default();
        let key = ResourceKey::review_comments("u");
        cache.set(key.clone(), ResourceValue::ReviewComments(vec![]));

        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(cache.is_fresh(&key, Duration::from_secs(30)));
        assert!(!cache.is_fresh(&key, Duration::from_secs(5)));
        assert!(!cache.is_fresh(&ResourceKey::review_comments("other"), Duration::from_secs(30)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_seeded_terminal_never_goes_stale() {
        let cache = ResourceCache::new(FreshnessPolicy::uniform(Duration::from_secs(1)));
        let key = ResourceKey::review_status("u");
        cache.seed_terminal(key.clone(), status(PrStatus::Merged));

        tokio::time::advance(Duration::from_secs(3600)).await;
        assert!(cache.has_fresh(&key));
        assert!(cache.is_fresh(&key, Duration::ZERO));
    }

    #[test]
    fn test_invalidate_prefix_removes_only_that_kind() {
        let cache = ResourceCache::default();
        cache.set(ResourceKey::review_status("a"), status(PrStatus::Open));
        cache.set(ResourceKey::review_status("b"), status(PrStatus::Open));
        cache.set(ResourceKey::review_comments("a"), ResourceValue::ReviewComments(vec![]));

        assert_eq!(cache.invalidate_prefix(ResourceKind::ReviewStatus), 2);
        assert!(cache.get(&ResourceKey::review_status("a")).is_none());
        assert!(cache.get(&ResourceKey::review_comments("a")).is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expire_kind_keeps_values_and_skips_pinned() {
        let cache = ResourceCache::new(FreshnessPolicy::uniform(Duration::from_secs(60)));
        let open = ResourceKey::review_status("open");
        let merged = ResourceKey::review_status("merged");
        cache.set(open.clone(), status(PrStatus::Open));
        cache.seed_terminal(merged.clone(), status(PrStatus::Merged));

        assert_eq!(cache.expire_kind(ResourceKind::ReviewStatus), 1);
        assert!(!cache.has_fresh(&open));
        assert!(cache.value(&open).is_some());
        assert!(cache.has_fresh(&merged));
    }

    #[test]
    fn test_expire_single_key() {
        let cache = ResourceCache::new(FreshnessPolicy::uniform(Duration::from_secs(60)));
        let key = ResourceKey::agent_conversation("bc-1");
        cache.set(
            key.clone(),
            ResourceValue::Conversation(crate::resources::Conversation::default()),
        );
        assert!(cache.expire(&key));
        assert!(!cache.has_fresh(&key));
        assert!(!cache.expire(&ResourceKey::agent_conversation("missing")));
    }

    #[test]
    fn test_set_overwrites_unconditionally() {
        let cache = ResourceCache::default();
        let key = ResourceKey::review_status("u");
        cache.set(key.clone(), status(PrStatus::Open));
        cache.set(key.clone(), status(PrStatus::Closed));
        assert_eq!(cache.value(&key), Some(status(PrStatus::Closed)));
    }

    #[test]
    fn test_agent_list_is_never_fresh() {
        let cache = ResourceCache::default();
        cache.set(ResourceKey::agent_list(), ResourceValue::AgentList(AgentsPage::default()));
        assert!(!cache.has_fresh(&ResourceKey::agent_list()));
        assert!(cache.agent_list().is_some());
    }

    #[test]
    fn test_subscribers_see_updates_and_removals() {
        let cache = ResourceCache::default();
        let mut events = cache.subscribe();
        let key = ResourceKey::review_status("u");

        cache.set(key.clone(), status(PrStatus::Open));
        cache.invalidate_prefix(ResourceKind::ReviewStatus);

        assert_eq!(events.try_recv().unwrap(), CacheEvent::Updated(key.clone()));
        assert_eq!(events.try_recv().unwrap(), CacheEvent::Removed(key));
    }

    #[test]
    fn test_policy_from_config() {
        let policy = FreshnessPolicy::from_config(&FreshnessConfig {
            review_status: Some(5),
            ..Default::default()
        });
        assert_eq!(policy.fresh_for(ResourceKind::ReviewStatus), Duration::from_secs(5));
        assert_eq!(
            policy.fresh_for(ResourceKind::AgentConversation),
            Duration::from_secs(300)
        );
        assert_eq!(policy.fresh_for(ResourceKind::AgentList), Duration::ZERO);
    }
}

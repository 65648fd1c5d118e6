//! The sync context: one explicit owner for all shared sync state.
//!
//! Created at start-up, torn down with [`SyncContext::shutdown`], and handed
//! to every component that reads or refreshes resources.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use agentboard_config::BoardConfig;
use agentboard_paths::BoardPaths;
use tokio::sync::{Notify, broadcast, watch};
use tokio::sync::futures::Notified;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cache::{CacheEvent, FreshnessPolicy, ResourceCache};
use crate::fetch::{FetchError, FetchExecutor, Transport};
use crate::poller::PollState;
use crate::resources::{AgentsPage, ResourceKey, ResourceKind, ResourceValue};
use crate::scheduler::{BatchOutcome, BatchProgress, BatchScheduler};
use crate::terminal::TerminalStore;
use crate::view::{Dashboard, DashboardFilter, build_dashboard};

#[derive(Debug, Default)]
struct CycleSlot {
    id: u64,
    cancel: Option<CancellationToken>,
}

#[derive(Debug)]
pub struct SyncContext<T: Transport> {
    config: BoardConfig,
    cache: Arc<ResourceCache>,
    terminal: Arc<TerminalStore>,
    executor: Arc<FetchExecutor<T>>,
    scheduler: BatchScheduler<T>,
    shutdown: CancellationToken,
    cycle: Mutex<CycleSlot>,
    refresh: Notify,
    list_error: RwLock<Option<FetchError>>,
    poll_state: watch::Sender<PollState>,
}

impl<T: Transport> SyncContext<T> {
    /// Build the context and seed every terminal record into the cache.
    pub fn new(config: BoardConfig, transport: T, terminal: TerminalStore) -> Arc<Self> {
        let cache = Arc::new(ResourceCache::new(FreshnessPolicy::from_config(
            &config.freshness,
        )));
        let terminal = Arc::new(terminal);
        let executor = Arc::new(FetchExecutor::new(transport, cache.clone(), terminal.clone()));
        let shutdown = CancellationToken::new();
        let scheduler = BatchScheduler::new(executor.clone(), config.sync.window_size(), shutdown.clone());
        let (poll_state, _) = watch::channel(PollState::Idle);

        let context = Self {
            config,
            cache,
            terminal,
            executor,
            scheduler,
            shutdown,
            cycle: Mutex::new(CycleSlot::default()),
            refresh: Notify::new(),
            list_error: RwLock::new(None),
            poll_state,
        };
        let seeded = context.reseed_terminal();
        info!(event = "core.context.create_completed", terminal_records = seeded);
        Arc::new(context)
    }

    /// Build the context with the terminal store from `~/.agentboard/`.
    pub fn open(config: BoardConfig, transport: T, paths: &BoardPaths) -> Arc<Self> {
        Self::new(config, transport, TerminalStore::load(paths.terminal_cache_file()))
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<ResourceCache> {
        &self.cache
    }

    pub fn terminal(&self) -> &Arc<TerminalStore> {
        &self.terminal
    }

    pub fn executor(&self) -> &Arc<FetchExecutor<T>> {
        &self.executor
    }

    pub fn scheduler(&self) -> &BatchScheduler<T> {
        &self.scheduler
    }

    // --- Reads ---

    /// Last synchronized agent list, possibly stale.
    pub fn cached_list(&self) -> Option<AgentsPage> {
        self.cache.agent_list()
    }

    /// Cached value for `key`, falling back to the terminal store.
    pub fn cached_resource(&self, key: &ResourceKey) -> Option<ResourceValue> {
        if let Some(value) = self.cache.value(key) {
            return Some(value);
        }
        let record = self.terminal.get(key)?;
        let value = ResourceValue::ReviewStatus(record.value);
        self.cache.seed_terminal(key.clone(), value.clone());
        Some(value)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.cache.subscribe()
    }

    pub fn batch_progress(&self) -> BatchProgress {
        self.scheduler.progress()
    }

    pub fn watch_progress(&self) -> watch::Receiver<BatchProgress> {
        self.scheduler.watch_progress()
    }

    pub fn poll_state(&self) -> PollState {
        *self.poll_state.borrow()
    }

    pub fn watch_poll_state(&self) -> watch::Receiver<PollState> {
        self.poll_state.subscribe()
    }

    /// The last agent-list failure, cleared by the next successful poll.
    pub fn list_error(&self) -> Option<FetchError> {
        self.list_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn dashboard(&self, filter: &DashboardFilter) -> Dashboard {
        match self.cached_list() {
            Some(page) => build_dashboard(&page, &self.cache, filter),
            None => Dashboard::default(),
        }
    }

    // --- Refresh ---

    /// Bring `keys` up to date as one batch job, superseding any running job.
    pub async fn refresh_resources(&self, keys: Vec<ResourceKey>) -> BatchOutcome {
        self.scheduler.run(keys).await
    }

    /// Skip the timer: cancel the in-flight cycle and batch, mark review
    /// statuses and comments stale, and wake the orchestrator.
    pub fn force_refresh(&self) {
        let cycle = self.lock_cycle().cancel.take();
        if let Some(cycle) = cycle {
            cycle.cancel();
        }
        self.scheduler.cancel();

        let statuses = self.cache.expire_kind(ResourceKind::ReviewStatus);
        let comments = self.cache.expire_kind(ResourceKind::ReviewComments);
        self.refresh.notify_one();

        info!(
            event = "core.context.force_refresh_requested",
            expired_statuses = statuses,
            expired_comments = comments
        );
    }

    /// Re-insert every terminal record into the cache. Returns the count.
    pub fn reseed_terminal(&self) -> usize {
        let seeds = self.terminal.seed_values();
        let count = seeds.len();
        for (key, value) in seeds {
            self.cache.seed_terminal(key, value);
        }
        debug!(event = "core.context.reseed_completed", count = count);
        count
    }

    // --- Lifecycle ---

    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            info!(event = "core.context.shutdown_started");
        }
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    // --- Orchestrator plumbing ---

    pub(crate) fn refresh_requested(&self) -> Notified<'_> {
        self.refresh.notified()
    }

    /// Start a poll cycle. Any cycle still running is cancelled.
    pub(crate) fn begin_cycle(&self) -> (u64, CancellationToken) {
        let token = self.shutdown.child_token();
        let id = {
            let mut slot = self.lock_cycle();
            if let Some(previous) = slot.cancel.replace(token.clone()) {
                previous.cancel();
            }
            slot.id += 1;
            slot.id
        };
        self.poll_state.send_replace(PollState::Polling);
        (id, token)
    }

    pub(crate) fn end_cycle(&self, id: u64) {
        let mut slot = self.lock_cycle();
        if slot.id == id {
            slot.cancel = None;
            self.poll_state.send_replace(PollState::Idle);
        }
    }

    pub(crate) fn set_list_error(&self, error: Option<FetchError>) {
        *self.list_error.write().unwrap_or_else(PoisonError::into_inner) = error;
    }

    fn lock_cycle(&self) -> std::sync::MutexGuard<'_, CycleSlot> {
        self.cycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::mock::{MockTransport, pr_json, pr_url, status_route};
    use crate::resources::{PrInfo, PrStatus};
    use tempfile::TempDir;

    fn merged(n: u64) -> PrInfo {
        PrInfo {
            status: PrStatus::Merged,
            title: format!("PR {}", n),
            number: n,
            updated_at: "2026-03-01T10:00:00Z".to_string(),
            draft: false,
        }
    }

    #[test]
    fn test_terminal_records_seeded_at_start() {
        let terminal = TerminalStore::in_memory();
        let key = ResourceKey::review_status(pr_url(1));
        terminal.record(key.clone(), merged(1));

        let ctx = SyncContext::new(BoardConfig::default(), MockTransport::new(), terminal);
        let entry = ctx.cache().get(&key).unwrap();
        assert!(entry.is_pinned());
        assert_eq!(ctx.poll_state(), PollState::Idle);
        assert!(ctx.list_error().is_none());
    }

    #[test]
    fn test_open_loads_terminal_store_from_paths() {
        let dir = TempDir::new().unwrap();
        let paths = BoardPaths::from_dir(dir.path().to_path_buf());
        let key = ResourceKey::review_status(pr_url(3));
        TerminalStore::load(paths.terminal_cache_file()).record(key.clone(), merged(3));

        let ctx = SyncContext::open(BoardConfig::default(), MockTransport::new(), &paths);
        assert!(ctx.terminal().contains(&key));
        assert!(ctx.cached_resource(&key).unwrap().is_terminal());
    }

    #[test]
    fn test_cached_resource_falls_back_to_terminal_store() {
        let ctx = SyncContext::new(
            BoardConfig::default(),
            MockTransport::new(),
            TerminalStore::in_memory(),
        );
        let key = ResourceKey::review_status(pr_url(2));
        ctx.terminal().record(key.clone(), merged(2));
        assert!(ctx.cache().get(&key).is_none());

        let value = ctx.cached_resource(&key).unwrap();
        assert!(value.is_terminal());
        assert!(ctx.cache().get(&key).unwrap().is_pinned());
    }

    #[tokio::test]
    async fn test_force_refresh_expires_statuses_but_not_terminal() {
        let transport = MockTransport::new();
        transport.respond_json(status_route(&pr_url(1)), pr_json("open", 1));
        let ctx = SyncContext::new(BoardConfig::default(), transport, TerminalStore::in_memory());

        let open = ResourceKey::review_status(pr_url(1));
        let closed = ResourceKey::review_status(pr_url(2));
        ctx.terminal().record(closed.clone(), merged(2));
        ctx.reseed_terminal();
        ctx.refresh_resources(vec![open.clone()]).await;
        assert!(ctx.cache().has_fresh(&open));

        ctx.force_refresh();
        assert!(!ctx.cache().has_fresh(&open));
        assert!(ctx.cached_resource(&open).is_some());
        assert!(ctx.cache().has_fresh(&closed));
    }

    #[tokio::test]
    async fn test_begin_cycle_cancels_previous() {
        let ctx = SyncContext::new(
            BoardConfig::default(),
            MockTransport::new(),
            TerminalStore::in_memory(),
        );
        let (first_id, first) = ctx.begin_cycle();
        assert_eq!(ctx.poll_state(), PollState::Polling);

        let (second_id, second) = ctx.begin_cycle();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());

        // A stale cycle ending does not flip the state back to idle.
        ctx.end_cycle(first_id);
        assert_eq!(ctx.poll_state(), PollState::Polling);
        ctx.end_cycle(second_id);
        assert_eq!(ctx.poll_state(), PollState::Idle);
    }

    #[test]
    fn test_shutdown_cancels_child_tokens() {
        let ctx = SyncContext::new(
            BoardConfig::default(),
            MockTransport::new(),
            TerminalStore::in_memory(),
        );
        let (_, cycle) = ctx.begin_cycle();
        ctx.shutdown();
        assert!(ctx.is_shut_down());
        assert!(cycle.is_cancelled());
    }

    #[test]
    fn test_dashboard_empty_without_list() {
        let ctx = SyncContext::new(
            BoardConfig::default(),
            MockTransport::new(),
            TerminalStore::in_memory(),
        );
        let dashboard = ctx.dashboard(&DashboardFilter::default());
        assert!(dashboard.rows.is_empty());
    }
}

//! Single-key fetches: one transport call, decode, commit.

use std::collections::HashSet;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::ResourceCache;
use crate::fetch::errors::FetchError;
use crate::fetch::traits::{RelayRequest, Transport};
use crate::resources::{AgentsPage, ResourceKey, ResourceValue};
use crate::terminal::TerminalStore;

/// Performs network fetches for resource keys and commits successes.
///
/// A failed fetch never touches the cache, so the previous value (if any)
/// keeps being served.
#[derive(Debug)]
pub struct FetchExecutor<T: Transport> {
    pub(crate) transport: T,
    pub(crate) cache: Arc<ResourceCache>,
    pub(crate) terminal: Arc<TerminalStore>,
}

impl<T: Transport> FetchExecutor<T> {
    pub fn new(transport: T, cache: Arc<ResourceCache>, terminal: Arc<TerminalStore>) -> Self {
        Self {
            transport,
            cache,
            terminal,
        }
    }

    pub fn cache(&self) -> &Arc<ResourceCache> {
        &self.cache
    }

    pub fn terminal(&self) -> &Arc<TerminalStore> {
        &self.terminal
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Key is recorded terminal or has a fresh cache entry.
    pub fn is_satisfied(&self, key: &ResourceKey) -> bool {
        self.terminal.contains(key) || self.cache.has_fresh(key)
    }

    /// Fetch `key` with exactly one transport call and commit the result.
    ///
    /// Terminal review statuses are recorded in the terminal store and pinned
    /// in the cache. No retries.
    pub async fn fetch(&self, key: &ResourceKey, cancel: &CancellationToken) -> Result<ResourceValue, FetchError> {
        let request = RelayRequest::for_key(key, None);
        debug!(event = "core.fetch.request_started", key = %key);

        let payload = self.transport.send(request, cancel.clone()).await?;
        let value = ResourceValue::decode(key.kind(), payload).map_err(|e| FetchError::Malformed {
            message: format!("{}: {}", key, e),
        })?;

        self.commit(key, &value).await;
        debug!(event = "core.fetch.request_completed", key = %key);
        Ok(value)
    }

    /// Fetch the agent list, following `nextCursor` for up to `max_pages` pages.
    ///
    /// Agents repeated across pages are kept once. The merged page is cached
    /// under the agent-list key; its `next_cursor` is set when more pages were
    /// left unfetched.
    pub async fn fetch_agent_list(
        &self,
        max_pages: usize,
        cancel: &CancellationToken,
    ) -> Result<AgentsPage, FetchError> {
        let key = ResourceKey::agent_list();
        let mut merged = AgentsPage::default();
        let mut seen = HashSet::new();
        let mut cursor: Option<String> = None;

        for page_index in 0..max_pages.max(1) {
            let request = RelayRequest::for_key(&key, cursor.as_deref());
            let payload = self.transport.send(request, cancel.clone()).await?;
            let page: AgentsPage = serde_json::from_value(payload).map_err(|e| FetchError::Malformed {
                message: format!("{}: {}", key, e),
            })?;

            debug!(
                event = "core.fetch.list_page_completed",
                page = page_index,
                agents = page.agents.len()
            );

            merged
                .agents
                .extend(page.agents.into_iter().filter(|agent| seen.insert(agent.id.clone())));
            cursor = page.next_cursor.filter(|c| !c.is_empty());
            if cursor.is_none() {
                break;
            }
        }

        merged.next_cursor = cursor;
        info!(
            event = "core.fetch.list_completed",
            agents = merged.agents.len(),
            truncated = merged.next_cursor.is_some()
        );
        self.cache.set(key, ResourceValue::AgentList(merged.clone()));
        Ok(merged)
    }

    async fn commit(&self, key: &ResourceKey, value: &ResourceValue) {
        match value {
            ResourceValue::ReviewStatus(info) if info.is_terminal() => {
                self.cache.seed_terminal(key.clone(), value.clone());
                if self.terminal.insert(key.clone(), info.clone()) && self.terminal.is_durable() {
                    self.persist_terminal().await;
                }
            }
            _ => self.cache.set(key.clone(), value.clone()),
        }
    }

    /// File writes run on the blocking pool, never on a runtime worker.
    async fn persist_terminal(&self) {
        let terminal = Arc::clone(&self.terminal);
        if let Err(e) = tokio::task::spawn_blocking(move || terminal.persist_best_effort()).await {
            warn!(event = "core.terminal.persist_task_failed", error = %e);
        }
    }
}

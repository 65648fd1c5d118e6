//! Periodic polling.
//!
//! Each cycle fetches the agent list, re-seeds terminal records, refreshes
//! review statuses as one batch job and then comments for open reviews as a
//! second job. Force refresh cancels the running cycle and starts over.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::context::SyncContext;
use crate::errors::BoardError;
use crate::fetch::{FetchError, Transport};
use crate::scheduler::{BatchJob, BatchOutcome};
use crate::view::{DashboardFilter, open_review_comment_keys, review_status_keys};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollState {
    Idle,
    Polling,
}

/// What one completed poll cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub agents: usize,
    pub terminal_seeded: usize,
    pub statuses: BatchOutcome,
    pub comments: BatchOutcome,
}

pub struct Orchestrator<T: Transport> {
    ctx: Arc<SyncContext<T>>,
    interval: Duration,
}

impl<T: Transport> Orchestrator<T> {
    pub fn new(ctx: Arc<SyncContext<T>>) -> Self {
        let interval = ctx.config().sync.poll_interval();
        Self { ctx, interval }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn context(&self) -> &Arc<SyncContext<T>> {
        &self.ctx
    }

    /// Run the polling loop on a new task until the context shuts down.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    /// Poll immediately, then on every interval or forced refresh, until the
    /// context's shutdown token is cancelled.
    pub async fn run(&self) {
        let shutdown = self.ctx.shutdown_token();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            event = "core.poller.start_completed",
            interval_secs = self.interval.as_secs()
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = self.ctx.refresh_requested() => {
                    debug!(event = "core.poller.forced_tick");
                    ticker.reset();
                }
                _ = ticker.tick() => {}
            }

            match self.poll_once().await {
                Ok(report) => info!(
                    event = "core.poller.cycle_completed",
                    agents = report.agents,
                    statuses_fetched = report.statuses.fetched(),
                    comments_fetched = report.comments.fetched()
                ),
                Err(FetchError::Cancelled) => debug!(event = "core.poller.cycle_cancelled"),
                Err(e) => warn!(
                    event = "core.poller.cycle_failed",
                    error = %e,
                    error_code = e.error_code()
                ),
            }
        }

        info!(event = "core.poller.stop_completed");
    }

    /// Run one full cycle now. The state returns to idle whatever the outcome.
    pub async fn poll_once(&self) -> Result<CycleReport, FetchError> {
        let (cycle_id, cancel) = self.ctx.begin_cycle();
        let result = self.cycle(&cancel).await;
        self.ctx.end_cycle(cycle_id);
        result
    }

    async fn cycle(&self, cancel: &CancellationToken) -> Result<CycleReport, FetchError> {
        let sync = &self.ctx.config().sync;
        let executor = self.ctx.executor();

        let page = match executor.fetch_agent_list(sync.max_pages(), cancel).await {
            Ok(page) => {
                self.ctx.set_list_error(None);
                page
            }
            Err(FetchError::Cancelled) => return Err(FetchError::Cancelled),
            Err(e) => {
                warn!(
                    event = "core.poller.list_failed",
                    error = %e,
                    retryable = e.is_retryable()
                );
                self.ctx.set_list_error(Some(e.clone()));
                return Err(e);
            }
        };

        let terminal_seeded = self.ctx.reseed_terminal();
        let scheduler = self.ctx.scheduler();

        let status_keys = review_status_keys(&page.agents);
        let statuses = scheduler
            .run_job(BatchJob::new(status_keys, sync.window_size(), cancel.child_token()))
            .await;
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let filter = DashboardFilter::from(&self.ctx.config().view);
        let comment_keys = open_review_comment_keys(&page.agents, self.ctx.cache(), &filter);
        let comments = scheduler
            .run_job(BatchJob::new(comment_keys, sync.window_size(), cancel.child_token()))
            .await;
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        Ok(CycleReport {
            agents: page.agents.len(),
            terminal_seeded,
            statuses,
            comments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::mock::{MockTransport, agent_json, comments_route, pr_json, pr_url, status_route};
    use crate::resources::ResourceKey;
    use crate::terminal::TerminalStore;
    use agentboard_config::BoardConfig;
    use serde_json::json;

    fn context(transport: MockTransport) -> Arc<SyncContext<MockTransport>> {
        SyncContext::new(BoardConfig::default(), transport, TerminalStore::in_memory())
    }

    /// 20 agents with PRs: 12 open, 8 merged.
    fn script_board(transport: &MockTransport, delay: Duration) {
        let agents: Vec<_> = (0..20)
            .map(|n| agent_json(&format!("a{}", n), "FINISHED", Some(&pr_url(n))))
            .collect();
        transport.respond_json("GET /api/agents", json!({ "agents": agents }));
        for n in 0..20 {
            let status = if n < 12 { "open" } else { "merged" };
            transport.respond_json_after(status_route(&pr_url(n)), pr_json(status, n as u64), delay);
            transport.respond_json_after(comments_route(&pr_url(n)), json!({ "comments": [] }), delay);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycle_fetches_statuses_then_open_comments() {
        let transport = MockTransport::new();
        script_board(&transport, Duration::from_millis(100));
        let ctx = context(transport);
        let orchestrator = Orchestrator::new(ctx.clone());

        let report = orchestrator.poll_once().await.unwrap();
        assert_eq!(report.agents, 20);
        assert_eq!(report.statuses.total, 20);
        assert_eq!(report.statuses.succeeded, 20);
        assert_eq!(report.comments.total, 12);
        assert_eq!(report.comments.succeeded, 12);
        assert_eq!(ctx.batch_progress().fetched, 12);
        assert!(!ctx.batch_progress().is_loading);
        assert_eq!(ctx.terminal().len(), 8);
        assert_eq!(ctx.poll_state(), PollState::Idle);

        let transport = ctx.executor().transport();
        assert_eq!(transport.calls_to("GET /api/pr-comments"), 12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hidden_expired_agents_get_no_comment_polling() {
        let transport = MockTransport::new();
        transport.respond_json(
            "GET /api/agents",
            json!({ "agents": [
                agent_json("gone", "EXPIRED", Some(&pr_url(1))),
                agent_json("live", "FINISHED", Some(&pr_url(2))),
            ]}),
        );
        for n in 1..=2 {
            transport.respond_json(status_route(&pr_url(n)), pr_json("open", n as u64));
            transport.respond_json(comments_route(&pr_url(n)), json!({ "comments": [] }));
        }
        let ctx = context(transport);

        let report = Orchestrator::new(ctx.clone()).poll_once().await.unwrap();
        assert_eq!(report.statuses.total, 2);
        assert_eq!(report.comments.total, 1);
        let transport = ctx.executor().transport();
        assert_eq!(transport.calls_to(&comments_route(&pr_url(2))), 1);
        assert_eq!(transport.calls_to(&comments_route(&pr_url(1))), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_comments_dispatched_in_windows_of_eight() {
        let transport = MockTransport::new();
        script_board(&transport, Duration::from_secs(1));
        let ctx = context(transport);

        let handle = {
            let orchestrator = Orchestrator::new(ctx.clone());
            tokio::spawn(async move { orchestrator.poll_once().await })
        };

        // Statuses take three one-second windows (8 + 8 + 4). Comments start at t=3s.
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(ctx.executor().transport().calls_to("GET /api/pr-comments"), 8);
        assert_eq!(ctx.batch_progress().total, 12);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(ctx.executor().transport().calls_to("GET /api/pr-comments"), 12);
        assert_eq!(ctx.batch_progress().fetched, 8);

        let report = handle.await.unwrap().unwrap();
        assert_eq!(report.comments.fetched(), 12);
        assert_eq!(ctx.batch_progress().fetched, 12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_cycle_skips_fresh_and_terminal() {
        let transport = MockTransport::new();
        script_board(&transport, Duration::ZERO);
        let ctx = context(transport);
        let orchestrator = Orchestrator::new(ctx.clone());

        orchestrator.poll_once().await.unwrap();
        let calls_after_first = ctx.executor().transport().call_count();

        tokio::time::advance(Duration::from_secs(10)).await;
        let report = orchestrator.poll_once().await.unwrap();
        assert_eq!(report.statuses.satisfied, 20);
        assert_eq!(report.comments.satisfied, 12);
        assert_eq!(report.statuses.fetched(), 0);
        // Only the list was fetched again.
        assert_eq!(ctx.executor().transport().call_count(), calls_after_first + 1);

        // Once the fresh window lapses, only open PRs are refetched.
        tokio::time::advance(Duration::from_secs(60)).await;
        let report = orchestrator.poll_once().await.unwrap();
        assert_eq!(report.statuses.satisfied, 8);
        assert_eq!(report.statuses.succeeded, 12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_failure_is_retained_until_next_success() {
        let transport = MockTransport::new();
        script_board(&transport, Duration::ZERO);
        let ctx = context(transport);
        let orchestrator = Orchestrator::new(ctx.clone());
        orchestrator.poll_once().await.unwrap();
        let previous = ctx.cached_list().unwrap();

        ctx.executor().transport().respond_error(
            "GET /api/agents",
            FetchError::Upstream {
                status: 502,
                message: "Bad Gateway".to_string(),
            },
        );
        let err = orchestrator.poll_once().await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(ctx.list_error(), Some(err));
        assert_eq!(ctx.cached_list(), Some(previous));
        assert_eq!(ctx.poll_state(), PollState::Idle);

        script_board(ctx.executor().transport(), Duration::ZERO);
        orchestrator.poll_once().await.unwrap();
        assert!(ctx.list_error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_refresh_cancels_and_restarts() {
        let transport = MockTransport::new();
        script_board(&transport, Duration::ZERO);
        let ctx = context(transport);
        let orchestrator = Orchestrator::new(ctx.clone()).with_interval(Duration::from_secs(3600));
        let handle = orchestrator.spawn();

        // First tick fires immediately.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(ctx.executor().transport().calls_to("GET /api/agents"), 1);
        let status_calls = ctx.executor().transport().calls_to("GET /api/pr-status");
        assert_eq!(status_calls, 20);

        // Make the next status fetches slow, then refresh twice: the first
        // refresh cycle is cancelled by the second.
        for n in 0..12 {
            ctx.executor().transport().respond_json_after(
                status_route(&pr_url(n)),
                pr_json("open", n as u64),
                Duration::from_secs(5),
            );
        }
        ctx.force_refresh();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(ctx.poll_state(), PollState::Polling);
        assert!(ctx.batch_progress().is_loading);

        ctx.force_refresh();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(ctx.executor().transport().calls_to("GET /api/agents"), 3);
        // Merged PRs are never refetched.
        for n in 12..20 {
            assert_eq!(
                ctx.executor().transport().calls_to(&status_route(&pr_url(n))),
                1
            );
        }
        assert_eq!(ctx.poll_state(), PollState::Idle);
        assert!(ctx.cache().has_fresh(&ResourceKey::review_status(pr_url(0))));

        ctx.shutdown();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_drives_cycles_until_shutdown() {
        let transport = MockTransport::new();
        script_board(&transport, Duration::ZERO);
        let ctx = context(transport);
        let handle = Orchestrator::new(ctx.clone()).spawn();

        tokio::time::sleep(Duration::from_secs(25)).await;
        // Ticks at 0s, 10s and 20s.
        assert_eq!(ctx.executor().transport().calls_to("GET /api/agents"), 3);

        ctx.shutdown();
        handle.await.unwrap();
        assert_eq!(ctx.poll_state(), PollState::Idle);
    }
}

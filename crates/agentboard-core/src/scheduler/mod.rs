//! Windowed batch fetching with progress and supersession.
//!
//! A job's keys are de-duplicated, keys that are already terminal or fresh are
//! counted as done up front, and the rest are fetched in consecutive windows
//! of at most `window_size` concurrent requests. Window N+1 starts only after
//! every fetch of window N has settled.
//!
//! Only one job owns the progress channel at a time. Starting a job cancels
//! the previous one and bumps the generation; updates from an older
//! generation are dropped.

pub mod types;

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::join_all;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::BoardError;
use crate::fetch::{FetchError, FetchExecutor, Transport};
use crate::resources::ResourceKey;

pub use types::{BatchJob, BatchOutcome, BatchProgress};

#[derive(Debug, Default)]
struct JobSlot {
    generation: u64,
    cancel: Option<CancellationToken>,
}

enum Settled {
    Succeeded,
    Failed,
    Abandoned,
}

#[derive(Debug)]
pub struct BatchScheduler<T: Transport> {
    executor: Arc<FetchExecutor<T>>,
    window_size: usize,
    parent: CancellationToken,
    slot: Mutex<JobSlot>,
    progress: watch::Sender<BatchProgress>,
}

impl<T: Transport> BatchScheduler<T> {
    /// Jobs started with [`run`](Self::run) get a child of `parent` as their token.
    pub fn new(executor: Arc<FetchExecutor<T>>, window_size: usize, parent: CancellationToken) -> Self {
        let (progress, _) = watch::channel(BatchProgress::default());
        Self {
            executor,
            window_size: window_size.max(1),
            parent,
            slot: Mutex::new(JobSlot::default()),
            progress,
        }
    }

    pub fn executor(&self) -> &Arc<FetchExecutor<T>> {
        &self.executor
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn progress(&self) -> BatchProgress {
        *self.progress.borrow()
    }

    pub fn watch_progress(&self) -> watch::Receiver<BatchProgress> {
        self.progress.subscribe()
    }

    /// Cancel the running job, if any. Its in-flight requests are abandoned.
    pub fn cancel(&self) {
        let token = self.lock_slot().cancel.take();
        if let Some(token) = token {
            token.cancel();
            info!(event = "core.scheduler.job_cancelled");
        }
    }

    /// Run `keys` as a new job with the configured window size.
    pub async fn run(&self, keys: Vec<ResourceKey>) -> BatchOutcome {
        let job = BatchJob::new(keys, self.window_size, self.parent.child_token());
        self.run_job(job).await
    }

    pub async fn run_job(&self, job: BatchJob) -> BatchOutcome {
        let BatchJob {
            keys,
            window_size,
            cancel,
        } = job;
        let generation = self.begin(cancel.clone());

        let keys = dedupe(keys);
        let total = keys.len();
        let (pending, satisfied) = self.partition(keys);
        let mut outcome = BatchOutcome {
            total,
            satisfied,
            ..Default::default()
        };

        // A job with nothing to fetch never reports loading.
        let is_loading = !pending.is_empty();
        self.publish(generation, |p| {
            *p = BatchProgress {
                fetched: satisfied,
                total,
                is_loading,
            }
        });

        info!(
            event = "core.scheduler.job_started",
            generation = generation,
            total = total,
            satisfied = satisfied,
            pending = pending.len(),
            window_size = window_size
        );

        let mut abandoned = 0;
        for window in pending.chunks(window_size) {
            if cancel.is_cancelled() {
                break;
            }

            // Keys may have become fresh while earlier windows ran.
            let (window, newly_satisfied) = self.partition(window.to_vec());
            if newly_satisfied > 0 {
                outcome.satisfied += newly_satisfied;
                self.publish(generation, |p| {
                    p.fetched = (p.fetched + newly_satisfied).min(p.total)
                });
            }

            let settled = join_all(window.iter().map(|key| self.fetch_one(generation, key, &cancel))).await;
            for result in settled {
                match result {
                    Settled::Succeeded => outcome.succeeded += 1,
                    Settled::Failed => outcome.failed += 1,
                    Settled::Abandoned => abandoned += 1,
                }
            }
        }

        outcome.cancelled = abandoned > 0 || outcome.fetched() + outcome.satisfied < total;
        self.finish(generation);

        info!(
            event = "core.scheduler.job_completed",
            generation = generation,
            total = outcome.total,
            satisfied = outcome.satisfied,
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            cancelled = outcome.cancelled
        );
        outcome
    }

    async fn fetch_one(&self, generation: u64, key: &ResourceKey, cancel: &CancellationToken) -> Settled {
        if cancel.is_cancelled() {
            return Settled::Abandoned;
        }

        match self.executor.fetch(key, cancel).await {
            Ok(_) => {
                self.publish(generation, bump);
                Settled::Succeeded
            }
            Err(FetchError::Cancelled) => {
                debug!(event = "core.scheduler.fetch_abandoned", key = %key);
                Settled::Abandoned
            }
            Err(e) => {
                warn!(
                    event = "core.scheduler.fetch_failed",
                    key = %key,
                    error = %e,
                    error_code = e.error_code()
                );
                self.publish(generation, bump);
                Settled::Failed
            }
        }
    }

    /// Split off keys that need no fetch. Returns the rest and the skipped count.
    fn partition(&self, keys: Vec<ResourceKey>) -> (Vec<ResourceKey>, usize) {
        let before = keys.len();
        let pending: Vec<ResourceKey> = keys
            .into_iter()
            .filter(|key| !self.executor.is_satisfied(key))
            .collect();
        let satisfied = before - pending.len();
        (pending, satisfied)
    }

    /// Claim the progress channel for a new job, cancelling the previous one.
    fn begin(&self, cancel: CancellationToken) -> u64 {
        let mut slot = self.lock_slot();
        if let Some(previous) = slot.cancel.take() {
            previous.cancel();
            debug!(
                event = "core.scheduler.job_superseded",
                generation = slot.generation
            );
        }
        slot.generation += 1;
        slot.cancel = Some(cancel);
        slot.generation
    }

    fn finish(&self, generation: u64) {
        let mut slot = self.lock_slot();
        if slot.generation != generation {
            return;
        }
        slot.cancel = None;
        self.progress.send_modify(|p| p.is_loading = false);
    }

    /// Apply `update` only while `generation` still owns the channel.
    fn publish(&self, generation: u64, update: impl FnOnce(&mut BatchProgress)) {
        let slot = self.lock_slot();
        if slot.generation == generation {
            self.progress.send_modify(update);
        }
    }

    fn lock_slot(&self) -> MutexGuard<'_, JobSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn bump(progress: &mut BatchProgress) {
    progress.fetched = (progress.fetched + 1).min(progress.total);
}

/// Drop repeated keys, keeping the first occurrence.
fn dedupe(keys: Vec<ResourceKey>) -> Vec<ResourceKey> {
    let mut seen = HashSet::with_capacity(keys.len());
    keys.into_iter().filter(|key| seen.insert(key.clone())).collect()
}

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::resources::ResourceKey;

/// Keys to bring up to date, fetched at most `window_size` at a time.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub keys: Vec<ResourceKey>,
    pub window_size: usize,
    pub cancel: CancellationToken,
}

impl BatchJob {
    /// `window_size` is clamped to at least 1.
    pub fn new(keys: Vec<ResourceKey>, window_size: usize, cancel: CancellationToken) -> Self {
        Self {
            keys,
            window_size: window_size.max(1),
            cancel,
        }
    }
}

/// Progress of the current job as seen by consumers.
///
/// `fetched` counts settled keys (success or failure) plus keys that needed no
/// fetch. It never exceeds `total` and equals it when the job completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    pub fetched: usize,
    pub total: usize,
    pub is_loading: bool,
}

impl BatchProgress {
    pub fn is_complete(&self) -> bool {
        self.fetched >= self.total
    }

    /// Completion ratio in `0.0..=1.0`. An empty job counts as complete.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.fetched as f64 / self.total as f64
        }
    }
}

impl std::fmt::Display for BatchProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.fetched, self.total)
    }
}

/// What happened to one job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    /// Distinct keys in the job.
    pub total: usize,
    /// Keys that were already terminal or fresh.
    pub satisfied: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: bool,
}

impl BatchOutcome {
    /// Keys that were actually sent to the transport and settled.
    pub fn fetched(&self) -> usize {
        self.succeeded + self.failed
    }
}

//! Core library for agentboard
//!
//! Keeps a live view of remote coding agents and their pull requests fresh
//! under periodic polling. The pieces, leaf first:
//!
//! - [`cache`]: in-memory resource cache with per-kind fresh windows
//! - [`fetch`]: the relay transport seam and single-key fetch executor
//! - [`terminal`]: durable store of merged/closed review statuses
//! - [`scheduler`]: windowed batch fetching with progress and cancellation
//! - [`poller`]: the periodic poll loop and force refresh
//! - [`context`]: the object that owns all of the above

pub mod cache;
pub mod context;
pub mod errors;
pub mod fetch;
pub mod logging;
pub mod poller;
pub mod resources;
pub mod scheduler;
pub mod terminal;
pub mod transitions;
pub mod view;

// Re-export commonly used types
pub use cache::{CacheEntry, CacheEvent, FreshnessPolicy, ResourceCache};
pub use context::SyncContext;
pub use errors::{BoardError, BoardResult};
pub use fetch::{FetchError, FetchExecutor, HttpTransport, RelayRequest, Transport};
pub use logging::init_logging;
pub use poller::{CycleReport, Orchestrator, PollState};
pub use resources::{
    Agent, AgentStatus, AgentsPage, Comment, Conversation, CreatedIssue, NewIssue, PrCommit, PrInfo,
    PrStatus, ResourceKey, ResourceKind, ResourceValue,
};
pub use scheduler::{BatchJob, BatchOutcome, BatchProgress, BatchScheduler};
pub use terminal::{TerminalRecord, TerminalStore, TerminalStoreError};
pub use transitions::{StatusTracker, StatusTransition, TransitionKind};
pub use view::{Dashboard, DashboardFilter, DashboardRow};

// Config re-exported so the CLI needs one import path.
pub use agentboard_config::BoardConfig;
pub use agentboard_paths::BoardPaths;

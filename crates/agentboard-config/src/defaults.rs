//! Built-in fallback values used when a config field is absent.

pub const DEFAULT_RELAY_URL: &str = "http://localhost:3000";

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_WINDOW_SIZE: usize = 8;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_MAX_PAGES: usize = 5;

// Freshness windows, in seconds.
pub const DEFAULT_AGENT_DETAIL_FRESH_SECS: u64 = 0;
pub const DEFAULT_AGENT_CONVERSATION_FRESH_SECS: u64 = 5 * 60;
pub const DEFAULT_REVIEW_STATUS_FRESH_SECS: u64 = 60;
pub const DEFAULT_REVIEW_COMMENTS_FRESH_SECS: u64 = 60;
pub const DEFAULT_REVIEW_COMMITS_FRESH_SECS: u64 = 60;
pub const DEFAULT_ISSUE_COMMENTS_FRESH_SECS: u64 = 60;

pub const DEFAULT_HIDE_EXPIRED: bool = true;
pub const DEFAULT_SHOW_CLOSED: bool = false;

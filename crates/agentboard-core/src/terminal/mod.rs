//! Durable store of review statuses that can never change again.
//!
//! A merged or closed pull request is recorded once and survives restarts in
//! `~/.agentboard/terminal-cache.json`. The file is a namespaced envelope
//! around a flat map from key string to record:
//!
//! ```json
//! {"namespace": "agentboard.terminal.v1", "records": {"review-status:https://...": {...}}}
//! ```
//!
//! Persistence is best-effort: write failures are logged and the in-memory
//! records stay authoritative for the session.

pub mod errors;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::resources::{PrInfo, ResourceKey, ResourceKind, ResourceValue};

pub use errors::TerminalStoreError;

pub const TERMINAL_NAMESPACE: &str = "agentboard.terminal.v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalRecord {
    pub value: PrInfo,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TerminalFile {
    namespace: String,
    #[serde(default)]
    records: BTreeMap<String, TerminalRecord>,
}

#[derive(Debug)]
pub struct TerminalStore {
    path: Option<PathBuf>,
    records: RwLock<BTreeMap<ResourceKey, TerminalRecord>>,
    write_lock: Mutex<()>,
}

impl TerminalStore {
    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            records: RwLock::new(BTreeMap::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Restore records from `path`.
    ///
    /// A missing file yields an empty store. An unreadable or corrupt file is
    /// logged and also yields an empty store; the next record overwrites it.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = match read_records(&path) {
            Ok(records) => {
                if !records.is_empty() {
                    info!(
                        event = "core.terminal.load_completed",
                        path = %path.display(),
                        count = records.len()
                    );
                }
                records
            }
            Err(e) => {
                warn!(
                    event = "core.terminal.load_failed",
                    path = %path.display(),
                    error = %e,
                    message = "Starting with an empty terminal cache"
                );
                BTreeMap::new()
            }
        };

        Self {
            path: Some(path),
            records: RwLock::new(records),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Record a terminal review status and persist it.
    ///
    /// Returns `false` without writing when the key is not a review-status key,
    /// when the status is still open, or when the key is already recorded.
    /// Async callers should use [`TerminalStore::insert`] and persist off the
    /// runtime worker.
    pub fn record(&self, key: ResourceKey, value: PrInfo) -> bool {
        let inserted = self.insert(key, value);
        if inserted {
            self.persist_best_effort();
        }
        inserted
    }

    /// Add a terminal review status to memory only.
    ///
    /// Same acceptance rules as [`TerminalStore::record`]. A `true` result
    /// means the file is behind memory until the next [`TerminalStore::persist`].
    pub fn insert(&self, key: ResourceKey, value: PrInfo) -> bool {
        if key.kind() != ResourceKind::ReviewStatus || !value.is_terminal() {
            debug!(event = "core.terminal.record_skipped", key = %key);
            return false;
        }

        {
            let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
            if records.contains_key(&key) {
                return false;
            }
            records.insert(
                key.clone(),
                TerminalRecord {
                    value,
                    recorded_at: Utc::now(),
                },
            );
        }

        info!(event = "core.terminal.record_completed", key = %key);
        true
    }

    /// Store is backed by a file.
    pub fn is_durable(&self) -> bool {
        self.path.is_some()
    }

    pub fn get(&self, key: &ResourceKey) -> Option<TerminalRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every record, ordered by key.
    pub fn records(&self) -> Vec<(ResourceKey, TerminalRecord)> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Records as cache values, ready for seeding.
    pub fn seed_values(&self) -> Vec<(ResourceKey, ResourceValue)> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(k, v)| (k.clone(), ResourceValue::ReviewStatus(v.value.clone())))
            .collect()
    }

    /// Remove every record and the backing file. Returns how many were removed.
    pub fn clear(&self) -> Result<usize, TerminalStoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let removed = {
            let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
            let count = records.len();
            records.clear();
            count
        };

        if let Some(path) = &self.path {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(TerminalStoreError::IoError { source: e }),
            }
        }

        info!(event = "core.terminal.clear_completed", removed = removed);
        Ok(removed)
    }

    /// Write the current records to disk atomically.
    pub fn persist(&self) -> Result<(), TerminalStoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let file = TerminalFile {
            namespace: TERMINAL_NAMESPACE.to_string(),
            records: self
                .records
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        };
        let content =
            serde_json::to_string_pretty(&file).map_err(|e| TerminalStoreError::SerializationError {
                message: e.to_string(),
            })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_file = path.with_extension("json.tmp");
        if let Err(e) = fs::write(&temp_file, &content) {
            cleanup_temp_file(&temp_file, &e);
            return Err(TerminalStoreError::IoError { source: e });
        }
        if let Err(e) = fs::rename(&temp_file, path) {
            cleanup_temp_file(&temp_file, &e);
            return Err(TerminalStoreError::IoError { source: e });
        }

        debug!(event = "core.terminal.persist_completed", path = %path.display());
        Ok(())
    }

    /// [`TerminalStore::persist`], logging instead of returning failures.
    pub fn persist_best_effort(&self) {
        if let Err(e) = self.persist() {
            warn!(
                event = "core.terminal.persist_failed",
                error = %e,
                message = "Terminal record kept in memory only"
            );
        }
    }
}

fn read_records(path: &Path) -> Result<BTreeMap<ResourceKey, TerminalRecord>, TerminalStoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(e.into()),
    };

    let file: TerminalFile =
        serde_json::from_str(&content).map_err(|e| TerminalStoreError::SerializationError {
            message: e.to_string(),
        })?;
    if file.namespace != TERMINAL_NAMESPACE {
        return Err(TerminalStoreError::WrongNamespace {
            found: file.namespace,
        });
    }

    let mut records = BTreeMap::new();
    for (raw_key, record) in file.records {
        match raw_key.parse::<ResourceKey>() {
            Ok(key) if key.kind() == ResourceKind::ReviewStatus && record.value.is_terminal() => {
                records.insert(key, record);
            }
            Ok(_) => {
                warn!(event = "core.terminal.record_ignored", key = %raw_key);
            }
            Err(e) => {
                warn!(event = "core.terminal.key_parse_failed", key = %raw_key, error = %e);
            }
        }
    }
    Ok(records)
}

fn cleanup_temp_file(temp_file: &Path, original_error: &std::io::Error) {
    if let Err(cleanup_err) = fs::remove_file(temp_file) {
        warn!(
            event = "core.terminal.temp_file_cleanup_failed",
            temp_file = %temp_file.display(),
            original_error = %original_error,
            cleanup_error = %cleanup_err,
        );
    }
}

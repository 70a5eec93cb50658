pub mod backend;

pub use backend::{JsonFileBackend, MemoryBackend, StorageBackend};

use crate::models::Interval;
use crate::{log_error, log_warn};

const ENABLE_LOGS: bool = true;

/// Single well-known storage key, inherited from the stored-data format.
pub const STORAGE_KEY: &str = "persistance";

/// Ordered log of completed intervals, flushed to the backend after every
/// mutation. Persistence is best-effort: a backend failure is logged and the
/// in-memory mutation stands.
pub struct IntervalLog {
    backend: Box<dyn StorageBackend>,
    intervals: Vec<Interval>,
    revision: u64,
}

impl IntervalLog {
    /// Load the log from the backend. A missing or unparsable stored value
    /// yields an empty log rather than an error.
    pub fn load(backend: Box<dyn StorageBackend>) -> Self {
        let intervals = match backend.get(STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(intervals) => intervals,
                Err(err) => {
                    log_warn!("stored interval log is unparsable, starting empty: {err}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                log_warn!("failed to read stored interval log, starting empty: {err:#}");
                Vec::new()
            }
        };

        Self {
            backend,
            intervals,
            revision: 0,
        }
    }

    pub fn append(&mut self, interval: Interval) {
        self.intervals.push(interval);
        self.revision += 1;
        self.persist();
    }

    pub fn reset(&mut self) {
        self.intervals.clear();
        self.revision += 1;
        self.persist();
    }

    /// Wholesale replacement, used by import. No ordering or overlap
    /// validation is performed on the incoming intervals.
    pub fn replace_all(&mut self, intervals: Vec<Interval>) {
        self.intervals = intervals;
        self.revision += 1;
        self.persist();
    }

    pub fn snapshot(&self) -> Vec<Interval> {
        self.intervals.clone()
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Bumped on every mutation; lets the refresh loop detect table changes
    /// without diffing.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn persist(&self) {
        let raw = match serde_json::to_string(&self.intervals) {
            Ok(raw) => raw,
            Err(err) => {
                log_error!("failed to serialize interval log: {err}");
                return;
            }
        };

        if let Err(err) = self.backend.set(STORAGE_KEY, &raw) {
            log_warn!("failed to persist interval log: {err:#}");
        }
    }
}

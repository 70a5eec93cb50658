use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    display::{table_rows, DisplaySink},
    error::MalformedImport,
    metrics::total_elapsed,
    models::Interval,
    store::IntervalLog,
};

use super::{TimerState, ToggleResult};

/// Point-in-time view of the shared state, for the refresh loop and for
/// export. `armed_at` is the pending start timestamp, if any.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSnapshot {
    pub intervals: Vec<Interval>,
    pub armed_at: Option<i64>,
    pub revision: u64,
}

struct TrackerInner {
    session: TimerState,
    log: IntervalLog,
}

/// Cheap-to-clone handle over the shared session + log. Every operation
/// takes the single mutex, so toggles, resets and imports are serialized
/// against each other and against the refresh loop.
#[derive(Clone)]
pub struct TrackerController {
    inner: Arc<Mutex<TrackerInner>>,
    display: Arc<dyn DisplaySink>,
}

impl TrackerController {
    pub fn new(log: IntervalLog, display: Arc<dyn DisplaySink>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TrackerInner {
                session: TimerState::new(),
                log,
            })),
            display,
        }
    }

    pub async fn toggle(&self) -> ToggleResult {
        self.toggle_at(Utc::now().timestamp_millis()).await
    }

    /// Arm the timer, or close the pending interval and append it. The
    /// completed path also pushes a fresh table to the display; both paths
    /// push the counter so the surface reacts without waiting for the loop.
    pub async fn toggle_at(&self, now_ms: i64) -> ToggleResult {
        let mut inner = self.inner.lock().await;
        let result = inner.session.toggle(now_ms);

        if let ToggleResult::Completed(interval) = result {
            inner.log.append(interval);
            self.push_table(&inner);
        }
        self.push_total(&inner, now_ms);

        result
    }

    /// Clear the log and drop any pending start.
    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        inner.log.reset();
        inner.session.disarm();

        self.push_table(&inner);
        self.push_total(&inner, Utc::now().timestamp_millis());
    }

    /// UTF-8 JSON bytes of the full log, ready to be packaged into a file.
    pub async fn export_json(&self) -> Result<Vec<u8>> {
        let inner = self.inner.lock().await;
        serde_json::to_vec(inner.log.intervals()).context("failed to serialize interval log")
    }

    /// Parse first, replace only on success: a malformed payload leaves the
    /// log and the session exactly as they were.
    pub async fn import_json(&self, payload: &str) -> Result<usize, MalformedImport> {
        let intervals: Vec<Interval> = serde_json::from_str(payload)?;

        let mut inner = self.inner.lock().await;
        inner.log.replace_all(intervals);
        let count = inner.log.len();

        self.push_table(&inner);
        self.push_total(&inner, Utc::now().timestamp_millis());

        Ok(count)
    }

    pub async fn snapshot(&self) -> TrackerSnapshot {
        let inner = self.inner.lock().await;
        TrackerSnapshot {
            intervals: inner.log.snapshot(),
            armed_at: inner.session.armed_at(),
            revision: inner.log.revision(),
        }
    }

    pub async fn is_armed(&self) -> bool {
        self.inner.lock().await.session.is_armed()
    }

    pub async fn total_elapsed(&self) -> i64 {
        self.total_elapsed_at(Utc::now().timestamp_millis()).await
    }

    pub async fn total_elapsed_at(&self, now_ms: i64) -> i64 {
        let inner = self.inner.lock().await;
        total_elapsed(inner.log.intervals(), inner.session.armed_at(), now_ms)
    }

    fn push_total(&self, inner: &TrackerInner, now_ms: i64) {
        let total = total_elapsed(inner.log.intervals(), inner.session.armed_at(), now_ms);
        self.display.show_total(total);
    }

    fn push_table(&self, inner: &TrackerInner) {
        self.display.show_intervals(&table_rows(inner.log.intervals()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::RecordingDisplay;
    use crate::store::{MemoryBackend, StorageBackend, STORAGE_KEY};

    fn tracker() -> (TrackerController, Arc<RecordingDisplay>, MemoryBackend) {
        let backend = MemoryBackend::new();
        let log = IntervalLog::load(Box::new(backend.clone()));
        let display = Arc::new(RecordingDisplay::new());
        (
            TrackerController::new(log, display.clone()),
            display,
            backend,
        )
    }

    #[tokio::test]
    async fn test_single_cycle_records_one_interval() {
        let (tracker, _display, _backend) = tracker();

        assert_eq!(tracker.toggle_at(0).await, ToggleResult::Started);
        assert_eq!(
            tracker.toggle_at(1000).await,
            ToggleResult::Completed(Interval::new(0, 1000))
        );

        let snapshot = tracker.snapshot().await;
        assert_eq!(snapshot.intervals, vec![Interval::new(0, 1000)]);
        assert_eq!(tracker.total_elapsed_at(5000).await, 1000);
    }

    #[tokio::test]
    async fn test_toggles_append_half_as_many_intervals() {
        let (tracker, _display, _backend) = tracker();

        for now in 0..9 {
            tracker.toggle_at(now * 100).await;
        }

        // 9 toggles -> floor(9 / 2) = 4 completed intervals.
        assert_eq!(tracker.snapshot().await.intervals.len(), 4);
        assert!(tracker.is_armed().await);
    }

    #[tokio::test]
    async fn test_two_cycles_scenario() {
        let (tracker, _display, _backend) = tracker();

        for now in [0, 100, 200, 500] {
            tracker.toggle_at(now).await;
        }

        let snapshot = tracker.snapshot().await;
        assert_eq!(
            snapshot.intervals,
            vec![Interval::new(0, 100), Interval::new(200, 500)]
        );
        assert_eq!(tracker.total_elapsed_at(500).await, 400);
    }

    #[tokio::test]
    async fn test_open_interval_counts_toward_total() {
        let (tracker, _display, _backend) = tracker();

        tracker.toggle_at(0).await;
        tracker.toggle_at(100).await;
        tracker.toggle_at(600).await;

        // 100ms closed plus the open interval running since 600.
        assert_eq!(tracker.total_elapsed_at(1000).await, 500);
    }

    #[tokio::test]
    async fn test_export_import_round_trip() {
        let (tracker, _display, _backend) = tracker();

        for now in [0, 100, 200, 500] {
            tracker.toggle_at(now).await;
        }

        let exported = tracker.export_json().await.unwrap();
        tracker.reset().await;
        assert!(tracker.snapshot().await.intervals.is_empty());

        let count = tracker
            .import_json(std::str::from_utf8(&exported).unwrap())
            .await
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(
            tracker.snapshot().await.intervals,
            vec![Interval::new(0, 100), Interval::new(200, 500)]
        );
    }

    #[tokio::test]
    async fn test_malformed_import_leaves_state_untouched() {
        let (tracker, _display, _backend) = tracker();

        tracker.toggle_at(0).await;
        tracker.toggle_at(100).await;
        let before = tracker.snapshot().await.intervals;

        assert!(tracker.import_json("not json").await.is_err());
        assert!(tracker.import_json("[[1,2,3]]").await.is_err());
        assert!(tracker.import_json("{\"a\":1}").await.is_err());

        assert_eq!(tracker.snapshot().await.intervals, before);
    }

    #[tokio::test]
    async fn test_reset_clears_log_and_disarms() {
        let (tracker, _display, backend) = tracker();

        tracker.toggle_at(0).await;
        tracker.toggle_at(100).await;
        tracker.toggle_at(200).await;
        assert!(tracker.is_armed().await);

        tracker.reset().await;

        assert!(!tracker.is_armed().await);
        assert!(tracker.snapshot().await.intervals.is_empty());
        assert_eq!(backend.get(STORAGE_KEY).unwrap().as_deref(), Some("[]"));

        // The discarded pending start must not leak into the next cycle.
        assert_eq!(tracker.toggle_at(500).await, ToggleResult::Started);
    }

    #[tokio::test]
    async fn test_mutations_push_display_updates() {
        let (tracker, display, _backend) = tracker();

        tracker.toggle_at(0).await;
        let totals_after_arm = display.total_count();
        let tables_after_arm = display.table_count();
        assert_eq!(totals_after_arm, 1);
        // Arming does not change the log, so no table rebuild yet.
        assert_eq!(tables_after_arm, 0);

        tracker.toggle_at(1000).await;
        assert_eq!(display.total_count(), 2);
        assert_eq!(display.table_count(), 1);
        assert_eq!(display.last_total(), Some(1000));

        tracker.reset().await;
        assert_eq!(display.last_total(), Some(0));
    }
}

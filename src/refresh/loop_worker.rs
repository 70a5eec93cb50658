use std::sync::Arc;

use chrono::Utc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::display::{table_rows, DisplaySink};
use crate::metrics::total_elapsed;
use crate::timer::TrackerController;

use super::RefreshConfig;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_info;

/// Cooperative redraw cycle: push the running total every pass, rebuild the
/// table only when the log revision moved. The first pass always draws both.
/// The cadence sleep is the loop's only suspension point besides the
/// cancellation select.
pub async fn refresh_loop(
    tracker: TrackerController,
    display: Arc<dyn DisplaySink>,
    config: RefreshConfig,
    cancel_token: CancellationToken,
) {
    let mut last_revision: Option<u64> = None;

    loop {
        let now_ms = Utc::now().timestamp_millis();
        let snapshot = tracker.snapshot().await;

        display.show_total(total_elapsed(&snapshot.intervals, snapshot.armed_at, now_ms));

        if last_revision != Some(snapshot.revision) {
            display.show_intervals(&table_rows(&snapshot.intervals));
            last_revision = Some(snapshot.revision);
        }

        let wait = if snapshot.armed_at.is_some() {
            config.armed_poll
        } else {
            config.idle_poll
        };

        tokio::select! {
            _ = sleep(wait) => {}
            _ = cancel_token.cancelled() => {
                log_info!("refresh loop shutting down");
                break;
            }
        }
    }
}

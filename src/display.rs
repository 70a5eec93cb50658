use std::io::{self, Write};

use chrono::{Local, TimeZone};

use crate::models::Interval;

/// One rendered table row: wall-clock start/end plus the raw millisecond
/// duration, matching the original three-column layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalRow {
    pub started: String,
    pub ended: String,
    pub duration_ms: i64,
}

/// Surface the core pushes updates to. Implementations render however they
/// like; the core only decides *when* to push.
pub trait DisplaySink: Send + Sync {
    /// Running counter update.
    fn show_total(&self, total_ms: i64);
    /// Full rebuild of the interval table.
    fn show_intervals(&self, rows: &[IntervalRow]);
}

pub fn format_total(total_ms: i64) -> String {
    format!("Total Time Spend: {total_ms}ms")
}

/// Local wall-clock time for a table cell. Timestamps outside chrono's
/// representable range fall back to the raw millisecond value.
pub fn format_clock(ts_ms: i64) -> String {
    match Local.timestamp_millis_opt(ts_ms).single() {
        Some(dt) => dt.format("%r").to_string(),
        None => format!("{ts_ms}"),
    }
}

pub fn table_rows(intervals: &[Interval]) -> Vec<IntervalRow> {
    intervals
        .iter()
        .map(|interval| IntervalRow {
            started: format_clock(interval.start_ms()),
            ended: format_clock(interval.end_ms()),
            duration_ms: interval.duration_ms(),
        })
        .collect()
}

/// Stdout renderer used by the binary. The counter redraws in place; the
/// table prints as a fresh block.
#[derive(Debug, Default)]
pub struct ConsoleDisplay;

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self
    }
}

impl DisplaySink for ConsoleDisplay {
    fn show_total(&self, total_ms: i64) {
        print!("\r{}", format_total(total_ms));
        let _ = io::stdout().flush();
    }

    fn show_intervals(&self, rows: &[IntervalRow]) {
        println!();
        println!("{:<14} {:<14} {:>12}", "start", "end", "duration(ms)");
        for row in rows {
            println!("{:<14} {:<14} {:>12}", row.started, row.ended, row.duration_ms);
        }
    }
}

/// Test double that records every push.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingDisplay {
    pub totals: std::sync::Mutex<Vec<i64>>,
    pub tables: std::sync::Mutex<Vec<Vec<IntervalRow>>>,
}

#[cfg(test)]
impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_count(&self) -> usize {
        self.totals.lock().unwrap().len()
    }

    pub fn table_count(&self) -> usize {
        self.tables.lock().unwrap().len()
    }

    pub fn last_total(&self) -> Option<i64> {
        self.totals.lock().unwrap().last().copied()
    }
}

#[cfg(test)]
impl DisplaySink for RecordingDisplay {
    fn show_total(&self, total_ms: i64) {
        self.totals.lock().unwrap().push(total_ms);
    }

    fn show_intervals(&self, rows: &[IntervalRow]) {
        self.tables.lock().unwrap().push(rows.to_vec());
    }
}

use serde::{Deserialize, Serialize};

use crate::models::Interval;

/// Two-state toggle machine. `Armed` holds the captured start timestamp;
/// it lives only in memory, so a process restart always comes back `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerState {
    Idle,
    #[serde(rename_all = "camelCase")]
    Armed { started_at: i64 },
}

impl Default for TimerState {
    fn default() -> Self {
        TimerState::Idle
    }
}

/// Outcome of a toggle: the timer either armed, or closed an interval the
/// caller must append to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleResult {
    Started,
    Completed(Interval),
}

impl TimerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        matches!(self, TimerState::Armed { .. })
    }

    pub fn armed_at(&self) -> Option<i64> {
        match *self {
            TimerState::Armed { started_at } => Some(started_at),
            TimerState::Idle => None,
        }
    }

    /// Total over both states; there are no error cases.
    pub fn toggle(&mut self, now_ms: i64) -> ToggleResult {
        match *self {
            TimerState::Idle => {
                *self = TimerState::Armed { started_at: now_ms };
                ToggleResult::Started
            }
            TimerState::Armed { started_at } => {
                *self = TimerState::Idle;
                ToggleResult::Completed(Interval::new(started_at, now_ms))
            }
        }
    }

    /// Drop a pending start without recording anything.
    pub fn disarm(&mut self) {
        *self = TimerState::Idle;
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reminders::ReminderKind;
use crate::timer::{TimerMode, TimerState};

/// State changes of the pomodoro timer and the reminder scheduler.
/// Hosts turn these into notifications; the CLI prints them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// A session ran out or was skipped. `focus_minutes` is set for work
    /// sessions, which are the only ones that count toward stats.
    SessionCompleted {
        mode: TimerMode,
        next_mode: TimerMode,
        focus_minutes: Option<u32>,
        completed_work_sessions: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        mode: TimerMode,
        session: u32,
        remaining_ms: u64,
        total_ms: u64,
        at: DateTime<Utc>,
    },
    ReminderDue {
        kind: ReminderKind,
        title: String,
        message: String,
        at: DateTime<Utc>,
    },
}

/// Epoch milliseconds as a UTC timestamp.
pub(crate) fn timestamp(now_ms: u64) -> DateTime<Utc> {
    i64::try_from(now_ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let event = Event::TimerReset { at: timestamp(0) };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "TimerReset");
        assert!(json["at"].as_str().unwrap().starts_with("1970-01-01T00:00:00"));
    }
}

use serde::{Deserialize, Serialize};

use super::TimerMode;

/// The `pomodoroSettings` record. Durations are in minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroSettings {
    #[serde(default = "default_work_duration")]
    pub work_duration: u32,
    #[serde(default = "default_short_break")]
    pub short_break_duration: u32,
    #[serde(default = "default_long_break")]
    pub long_break_duration: u32,
    #[serde(default = "default_sessions_until_long_break")]
    pub sessions_until_long_break: u32,
    #[serde(default)]
    pub auto_start_breaks: bool,
    #[serde(default)]
    pub auto_start_work: bool,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
}

fn default_work_duration() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_sessions_until_long_break() -> u32 {
    4
}
fn default_true() -> bool {
    true
}

impl Default for PomodoroSettings {
    fn default() -> Self {
        Self {
            work_duration: default_work_duration(),
            short_break_duration: default_short_break(),
            long_break_duration: default_long_break(),
            sessions_until_long_break: default_sessions_until_long_break(),
            auto_start_breaks: false,
            auto_start_work: false,
            notifications_enabled: true,
        }
    }
}

impl PomodoroSettings {
    pub fn minutes_for(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Work => self.work_duration,
            TimerMode::ShortBreak => self.short_break_duration,
            TimerMode::LongBreak => self.long_break_duration,
        }
    }

    pub fn duration_ms(&self, mode: TimerMode) -> u64 {
        u64::from(self.minutes_for(mode)) * 60_000
    }

    /// Sessions per cycle; a stored zero behaves as one.
    pub fn cycle_len(&self) -> u32 {
        self.sessions_until_long_break.max(1)
    }

    pub fn auto_starts(&self, mode: TimerMode) -> bool {
        match mode {
            TimerMode::Work => self.auto_start_work,
            TimerMode::ShortBreak | TimerMode::LongBreak => self.auto_start_breaks,
        }
    }
}

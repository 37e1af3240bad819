//! Pomodoro timer engine.
//!
//! The timer is a wall-clock-based state machine. It does not use internal
//! threads; the caller passes the current time into every command and is
//! responsible for calling `tick()` periodically. The whole engine is
//! serializable so a host that unloads between events can persist it under
//! `pomodoroTimer` and pick up where it left off.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!           |
//!           v (session ends or is skipped)
//!         Idle | Running (auto-start) in the next mode
//! ```
//!
//! Modes cycle `work -> shortBreak -> work ...`, with every Nth completed
//! work session followed by `longBreak`.

use serde::{Deserialize, Serialize};

use super::settings::PomodoroSettings;
use crate::events::{timestamp, Event};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    Work,
    ShortBreak,
    LongBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// Core pomodoro engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroTimer {
    mode: TimerMode,
    state: TimerState,
    /// 1-based position of the next work session within the cycle.
    current_session: u32,
    /// Work sessions finished since the last reset.
    completed_work_sessions: u32,
    remaining_ms: u64,
    total_ms: u64,
    /// Timestamp (ms since epoch) of the last flush while running.
    #[serde(default)]
    last_tick_epoch_ms: Option<u64>,
}

impl PomodoroTimer {
    /// Idle at the start of the first work session.
    pub fn new(settings: &PomodoroSettings) -> Self {
        let total_ms = settings.duration_ms(TimerMode::Work);
        Self {
            mode: TimerMode::Work,
            state: TimerState::Idle,
            current_session: 1,
            completed_work_sessions: 0,
            remaining_ms: total_ms,
            total_ms,
            last_tick_epoch_ms: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn current_session(&self) -> u32 {
        self.current_session
    }

    pub fn completed_work_sessions(&self) -> u32 {
        self.completed_work_sessions
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ms
    }

    /// 0.0 .. 1.0 progress within the current session.
    pub fn progress(&self) -> f64 {
        if self.total_ms == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_ms as f64 / self.total_ms as f64)
    }

    /// Remaining time as of `now_ms`, without mutating the engine.
    pub fn remaining_at(&self, now_ms: u64) -> u64 {
        match (self.state, self.last_tick_epoch_ms) {
            (TimerState::Running, Some(last)) => self
                .remaining_ms
                .saturating_sub(now_ms.saturating_sub(last)),
            _ => self.remaining_ms,
        }
    }

    pub fn snapshot(&self, now_ms: u64) -> Event {
        Event::StateSnapshot {
            state: self.state,
            mode: self.mode,
            session: self.current_session,
            remaining_ms: self.remaining_at(now_ms),
            total_ms: self.total_ms,
            at: timestamp(now_ms),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, now_ms: u64) -> Option<Event> {
        match self.state {
            TimerState::Idle => {
                self.state = TimerState::Running;
                self.last_tick_epoch_ms = Some(now_ms);
                Some(Event::TimerStarted {
                    mode: self.mode,
                    duration_secs: self.remaining_ms / 1000,
                    at: timestamp(now_ms),
                })
            }
            TimerState::Paused => self.resume(now_ms),
            TimerState::Running => None,
        }
    }

    pub fn pause(&mut self, now_ms: u64) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.flush_elapsed(now_ms);
        self.state = TimerState::Paused;
        self.last_tick_epoch_ms = None;
        Some(Event::TimerPaused {
            remaining_ms: self.remaining_ms,
            at: timestamp(now_ms),
        })
    }

    pub fn resume(&mut self, now_ms: u64) -> Option<Event> {
        if self.state != TimerState::Paused {
            return None;
        }
        self.state = TimerState::Running;
        self.last_tick_epoch_ms = Some(now_ms);
        Some(Event::TimerResumed {
            remaining_ms: self.remaining_ms,
            at: timestamp(now_ms),
        })
    }

    /// Finish the current session early. Skipping a work session counts it
    /// as completed.
    pub fn skip(&mut self, settings: &PomodoroSettings, now_ms: u64) -> Event {
        self.complete(settings, now_ms)
    }

    /// Back to an idle first work session; the cycle restarts.
    pub fn reset(&mut self, settings: &PomodoroSettings, now_ms: u64) -> Event {
        *self = Self::new(settings);
        Event::TimerReset {
            at: timestamp(now_ms),
        }
    }

    /// Call periodically. Returns `Some(Event::SessionCompleted)` when the
    /// running session runs out.
    pub fn tick(&mut self, settings: &PomodoroSettings, now_ms: u64) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.flush_elapsed(now_ms);
        if self.remaining_ms == 0 {
            return Some(self.complete(settings, now_ms));
        }
        None
    }

    /// Pick up changed durations. A running or paused session keeps its
    /// remaining time; an idle one is resized.
    pub fn apply_settings(&mut self, settings: &PomodoroSettings) {
        if self.state == TimerState::Idle {
            self.total_ms = settings.duration_ms(self.mode);
            self.remaining_ms = self.total_ms;
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn flush_elapsed(&mut self, now_ms: u64) {
        if let Some(last) = self.last_tick_epoch_ms {
            let elapsed = now_ms.saturating_sub(last);
            self.remaining_ms = self.remaining_ms.saturating_sub(elapsed);
            self.last_tick_epoch_ms = Some(now_ms);
        }
    }

    fn complete(&mut self, settings: &PomodoroSettings, now_ms: u64) -> Event {
        let finished = self.mode;
        let cycle = settings.cycle_len();
        let mut focus_minutes = None;

        self.mode = match finished {
            TimerMode::Work => {
                self.completed_work_sessions += 1;
                focus_minutes = Some(settings.work_duration);
                if self.completed_work_sessions % cycle == 0 {
                    TimerMode::LongBreak
                } else {
                    TimerMode::ShortBreak
                }
            }
            TimerMode::ShortBreak | TimerMode::LongBreak => {
                self.current_session = self.completed_work_sessions % cycle + 1;
                TimerMode::Work
            }
        };

        self.total_ms = settings.duration_ms(self.mode);
        self.remaining_ms = self.total_ms;
        if settings.auto_starts(self.mode) {
            self.state = TimerState::Running;
            self.last_tick_epoch_ms = Some(now_ms);
        } else {
            self.state = TimerState::Idle;
            self.last_tick_epoch_ms = None;
        }

        Event::SessionCompleted {
            mode: finished,
            next_mode: self.mode,
            focus_minutes,
            completed_work_sessions: self.completed_work_sessions,
            at: timestamp(now_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: u64 = 60_000;

    fn completed(event: &Event) -> (TimerMode, TimerMode, Option<u32>) {
        match event {
            Event::SessionCompleted {
                mode,
                next_mode,
                focus_minutes,
                ..
            } => (*mode, *next_mode, *focus_minutes),
            other => panic!("expected SessionCompleted, got {other:?}"),
        }
    }

    #[test]
    fn start_pause_resume() {
        let settings = PomodoroSettings::default();
        let mut timer = PomodoroTimer::new(&settings);
        assert_eq!(timer.state(), TimerState::Idle);

        assert!(timer.start(0).is_some());
        assert_eq!(timer.state(), TimerState::Running);
        assert!(timer.start(10).is_none());

        assert!(timer.pause(MIN).is_some());
        assert_eq!(timer.state(), TimerState::Paused);
        assert_eq!(timer.remaining_ms(), 24 * MIN);

        // Time spent paused does not count.
        assert!(timer.resume(10 * MIN).is_some());
        assert_eq!(timer.state(), TimerState::Running);
        assert!(timer.tick(&settings, 11 * MIN).is_none());
        assert_eq!(timer.remaining_ms(), 23 * MIN);
    }

    #[test]
    fn work_session_completes_into_short_break() {
        let settings = PomodoroSettings::default();
        let mut timer = PomodoroTimer::new(&settings);
        timer.start(0);

        let event = timer.tick(&settings, 25 * MIN).unwrap();
        assert_eq!(
            completed(&event),
            (TimerMode::Work, TimerMode::ShortBreak, Some(25))
        );
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.remaining_ms(), 5 * MIN);
        assert_eq!(timer.completed_work_sessions(), 1);
    }

    #[test]
    fn every_fourth_work_session_earns_a_long_break() {
        let settings = PomodoroSettings::default();
        let mut timer = PomodoroTimer::new(&settings);
        let mut breaks = Vec::new();
        for _ in 0..8 {
            let (finished, next, _) = completed(&timer.skip(&settings, 0));
            if finished == TimerMode::Work {
                breaks.push(next);
            }
        }
        assert_eq!(
            breaks,
            vec![
                TimerMode::ShortBreak,
                TimerMode::ShortBreak,
                TimerMode::ShortBreak,
                TimerMode::LongBreak
            ]
        );
        assert_eq!(timer.mode(), TimerMode::Work);
        assert_eq!(timer.current_session(), 1);
    }

    #[test]
    fn skipping_a_break_counts_nothing() {
        let settings = PomodoroSettings::default();
        let mut timer = PomodoroTimer::new(&settings);
        timer.skip(&settings, 0);
        let (finished, next, focus) = completed(&timer.skip(&settings, 0));
        assert_eq!(finished, TimerMode::ShortBreak);
        assert_eq!(next, TimerMode::Work);
        assert_eq!(focus, None);
        assert_eq!(timer.current_session(), 2);
    }

    #[test]
    fn auto_start_keeps_running() {
        let settings = PomodoroSettings {
            auto_start_breaks: true,
            ..PomodoroSettings::default()
        };
        let mut timer = PomodoroTimer::new(&settings);
        timer.start(0);
        timer.tick(&settings, 25 * MIN).unwrap();
        assert_eq!(timer.state(), TimerState::Running);
        assert_eq!(timer.mode(), TimerMode::ShortBreak);

        let event = timer.tick(&settings, 30 * MIN).unwrap();
        assert_eq!(completed(&event).1, TimerMode::Work);
        assert_eq!(timer.state(), TimerState::Idle);
    }

    #[test]
    fn reset_goes_to_beginning() {
        let settings = PomodoroSettings::default();
        let mut timer = PomodoroTimer::new(&settings);
        timer.skip(&settings, 0);
        timer.skip(&settings, 0);
        timer.start(0);
        timer.reset(&settings, 0);
        assert_eq!(timer, PomodoroTimer::new(&settings));
    }

    #[test]
    fn apply_settings_only_resizes_idle_sessions() {
        let mut settings = PomodoroSettings::default();
        let mut timer = PomodoroTimer::new(&settings);
        settings.work_duration = 50;
        timer.apply_settings(&settings);
        assert_eq!(timer.total_ms(), 50 * MIN);

        timer.start(0);
        settings.work_duration = 10;
        timer.apply_settings(&settings);
        assert_eq!(timer.remaining_ms(), 50 * MIN);
    }

    #[test]
    fn snapshot_reports_live_remaining_time() {
        let settings = PomodoroSettings::default();
        let mut timer = PomodoroTimer::new(&settings);
        timer.start(0);
        match timer.snapshot(5 * MIN) {
            Event::StateSnapshot {
                state,
                remaining_ms,
                ..
            } => {
                assert_eq!(state, TimerState::Running);
                assert_eq!(remaining_ms, 20 * MIN);
            }
            _ => panic!("Expected StateSnapshot"),
        }
        assert_eq!(timer.remaining_ms(), 25 * MIN);
    }

    #[test]
    fn persisted_engine_resumes_after_reload() {
        let settings = PomodoroSettings::default();
        let mut timer = PomodoroTimer::new(&settings);
        timer.start(0);
        let json = serde_json::to_value(&timer).unwrap();
        assert_eq!(json["mode"], "work");
        assert_eq!(json["state"], "running");

        let mut reloaded: PomodoroTimer = serde_json::from_value(json).unwrap();
        assert!(reloaded.tick(&settings, 25 * MIN).is_some());
    }
}

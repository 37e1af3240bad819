//! Load, drive and persist the timer for hosts that unload between events.

use serde::Serialize;
use tracing::info;

use super::{DayStats, PomodoroSettings, PomodoroTimer, TimerMode, TimerState};
use crate::clock::Clock;
use crate::error::StorageError;
use crate::events::Event;
use crate::storage::{ExtensionStore, KvStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    Start,
    Pause,
    Resume,
    Skip,
    Reset,
    Tick,
    Status,
}

/// What a host shows after any timer command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerStatus {
    pub state: TimerState,
    pub mode: TimerMode,
    pub session: u32,
    pub remaining_ms: u64,
    pub total_ms: u64,
    pub today: DayStats,
    pub productivity_score: u32,
    pub events: Vec<Event>,
}

/// Apply `command` to the persisted timer.
///
/// Elapsed time is flushed first, so a session that ran out while the host
/// was asleep completes (and is counted) before the command itself runs.
pub fn run<S: KvStore>(
    store: &ExtensionStore<S>,
    clock: &dyn Clock,
    command: TimerCommand,
) -> Result<TimerStatus, StorageError> {
    let now = clock.now_ms();
    let settings = store.pomodoro_settings()?;
    let mut timer = store.pomodoro_timer(&settings)?;

    let mut events: Vec<Event> = timer.tick(&settings, now).into_iter().collect();
    let commanded = match command {
        TimerCommand::Start => timer.start(now),
        TimerCommand::Pause => timer.pause(now),
        TimerCommand::Resume => timer.resume(now),
        TimerCommand::Skip => Some(timer.skip(&settings, now)),
        TimerCommand::Reset => Some(timer.reset(&settings, now)),
        TimerCommand::Tick | TimerCommand::Status => None,
    };
    events.extend(commanded);

    let mut stats = store.pomodoro_stats()?;
    let mut stats_changed = false;
    for event in &events {
        if let Event::SessionCompleted {
            focus_minutes: Some(minutes),
            ..
        } = event
        {
            let today = stats.record_session(clock.today(), *minutes);
            info!(
                sessions = today.completed_sessions,
                minutes = today.total_focus_time,
                "work session completed"
            );
            stats_changed = true;
        }
    }
    if stats_changed {
        store.save_pomodoro_stats(&stats)?;
    }
    if !events.is_empty() {
        store.save_pomodoro_timer(&timer)?;
    }

    Ok(status(&timer, stats.day(clock.today()), now, events))
}

/// Persist new settings and resize an idle session to match.
pub fn update_settings<S: KvStore>(
    store: &ExtensionStore<S>,
    clock: &dyn Clock,
    settings: &PomodoroSettings,
) -> Result<TimerStatus, StorageError> {
    let mut timer = store.pomodoro_timer(&store.pomodoro_settings()?)?;
    timer.apply_settings(settings);
    store.save_pomodoro_settings(settings)?;
    store.save_pomodoro_timer(&timer)?;
    let today = store.pomodoro_stats()?.day(clock.today());
    Ok(status(&timer, today, clock.now_ms(), Vec::new()))
}

fn status(timer: &PomodoroTimer, today: DayStats, now_ms: u64, events: Vec<Event>) -> TimerStatus {
    TimerStatus {
        state: timer.state(),
        mode: timer.mode(),
        session: timer.current_session(),
        remaining_ms: timer.remaining_at(now_ms),
        total_ms: timer.total_ms(),
        today,
        productivity_score: today.productivity_score(),
        events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;
    use chrono::{Duration, NaiveDate};

    fn setup() -> (ExtensionStore<MemoryStore>, ManualClock) {
        let clock = ManualClock::at(NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(), 9);
        (ExtensionStore::new(MemoryStore::new()), clock)
    }

    #[test]
    fn completed_session_survives_reload_and_is_counted() {
        let (store, clock) = setup();
        let status = run(&store, &clock, TimerCommand::Start).unwrap();
        assert_eq!(status.state, TimerState::Running);
        assert_eq!(status.events.len(), 1);

        clock.advance(Duration::minutes(10));
        let status = run(&store, &clock, TimerCommand::Status).unwrap();
        assert_eq!(status.remaining_ms, 15 * 60_000);
        assert!(status.events.is_empty());

        clock.advance(Duration::minutes(16));
        let status = run(&store, &clock, TimerCommand::Tick).unwrap();
        assert_eq!(status.mode, TimerMode::ShortBreak);
        assert_eq!(status.state, TimerState::Idle);
        assert_eq!(status.today.completed_sessions, 1);
        assert_eq!(status.today.total_focus_time, 25);
        assert_eq!(status.productivity_score, 13);
    }

    #[test]
    fn pause_then_reset() {
        let (store, clock) = setup();
        run(&store, &clock, TimerCommand::Start).unwrap();
        clock.advance(Duration::minutes(5));
        let status = run(&store, &clock, TimerCommand::Pause).unwrap();
        assert_eq!(status.state, TimerState::Paused);
        assert_eq!(status.remaining_ms, 20 * 60_000);

        clock.advance(Duration::minutes(30));
        let status = run(&store, &clock, TimerCommand::Status).unwrap();
        assert_eq!(status.remaining_ms, 20 * 60_000);

        let status = run(&store, &clock, TimerCommand::Reset).unwrap();
        assert_eq!(status.state, TimerState::Idle);
        assert_eq!(status.remaining_ms, 25 * 60_000);
    }

    #[test]
    fn settings_resize_idle_timer() {
        let (store, clock) = setup();
        let settings = PomodoroSettings {
            work_duration: 45,
            ..PomodoroSettings::default()
        };
        let status = update_settings(&store, &clock, &settings).unwrap();
        assert_eq!(status.total_ms, 45 * 60_000);

        let status = run(&store, &clock, TimerCommand::Skip).unwrap();
        assert_eq!(status.today.total_focus_time, 45);
    }
}

mod engine;
mod service;
mod settings;
mod stats;

pub use engine::{PomodoroTimer, TimerMode, TimerState};
pub use service::{run, update_settings, TimerCommand, TimerStatus};
pub use settings::PomodoroSettings;
pub use stats::{DayStats, PomodoroStats, TARGET_SESSIONS_PER_DAY};

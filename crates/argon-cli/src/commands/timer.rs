use argon_core::timer::{self, TimerCommand};
use clap::Subcommand;

use super::{open_router, print_json, CmdResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start the current session
    Start,
    /// Pause a running session
    Pause,
    /// Resume a paused session
    Resume,
    /// End the current session now and move to the next mode
    Skip,
    /// Back to an idle work session
    Reset,
    /// Print current timer state as JSON
    Status,
    /// Change durations (minutes) or the long-break cycle
    Settings {
        #[arg(long)]
        work: Option<u32>,
        #[arg(long)]
        short_break: Option<u32>,
        #[arg(long)]
        long_break: Option<u32>,
        /// Work sessions before a long break
        #[arg(long)]
        cycle: Option<u32>,
        #[arg(long)]
        auto_start_breaks: Option<bool>,
        #[arg(long)]
        auto_start_work: Option<bool>,
    },
}

pub fn run(action: TimerAction) -> CmdResult {
    let router = open_router()?;
    let command = match action {
        TimerAction::Start => TimerCommand::Start,
        TimerAction::Pause => TimerCommand::Pause,
        TimerAction::Resume => TimerCommand::Resume,
        TimerAction::Skip => TimerCommand::Skip,
        TimerAction::Reset => TimerCommand::Reset,
        TimerAction::Status => TimerCommand::Status,
        TimerAction::Settings {
            work,
            short_break,
            long_break,
            cycle,
            auto_start_breaks,
            auto_start_work,
        } => {
            let mut settings = router.store().pomodoro_settings()?;
            if let Some(minutes) = work {
                settings.work_duration = minutes.max(1);
            }
            if let Some(minutes) = short_break {
                settings.short_break_duration = minutes.max(1);
            }
            if let Some(minutes) = long_break {
                settings.long_break_duration = minutes.max(1);
            }
            if let Some(sessions) = cycle {
                settings.sessions_until_long_break = sessions.max(1);
            }
            if let Some(auto) = auto_start_breaks {
                settings.auto_start_breaks = auto;
            }
            if let Some(auto) = auto_start_work {
                settings.auto_start_work = auto;
            }
            let status = timer::update_settings(router.store(), router.clock(), &settings)?;
            return print_json(&status);
        }
    };
    let status = timer::run(router.store(), router.clock(), command)?;
    print_json(&status)
}

use std::collections::BTreeMap;

use argon_core::reminders::{IntervalUnit, Reminder, ReminderKind};
use argon_core::Clock;
use clap::Subcommand;
use serde_json::json;

use super::{open_router, print_json, CmdResult};

#[derive(Subcommand)]
pub enum ReminderAction {
    /// Print every reminder and today's stats
    List,
    /// Enable a reminder, or all of them
    Enable {
        /// posture, hydration, eye, movement, breathing or screen
        kind: Option<ReminderKind>,
    },
    /// Disable a reminder, or all of them
    Disable { kind: Option<ReminderKind> },
    /// Change a reminder's interval
    Interval {
        kind: ReminderKind,
        value: u32,
        /// Interpret `value` as hours instead of minutes
        #[arg(long)]
        hours: bool,
    },
    /// Fire reminders whose time has come
    Due,
    /// Record that the last reminder was followed
    Followed,
}

pub fn run(action: ReminderAction) -> CmdResult {
    let router = open_router()?;
    let clock = router.clock();
    let now = clock.now_ms();
    let today = clock.today();
    let mut reminders = router.store().health_reminders(today)?;

    match action {
        ReminderAction::List => {}
        ReminderAction::Enable { kind: Some(kind) } => reminders.toggle(kind, true, now),
        ReminderAction::Enable { kind: None } => reminders.toggle_all(true, now),
        ReminderAction::Disable { kind: Some(kind) } => reminders.toggle(kind, false, now),
        ReminderAction::Disable { kind: None } => reminders.toggle_all(false, now),
        ReminderAction::Interval { kind, value, hours } => {
            reminders.set_interval(kind, value, now)?;
            let unit = if hours {
                IntervalUnit::Hours
            } else {
                IntervalUnit::Minutes
            };
            reminders.set_unit(kind, unit, now);
        }
        ReminderAction::Due => {
            let fired = reminders.due(now, today);
            router.store().save_health_reminders(&reminders)?;
            return print_json(&fired);
        }
        ReminderAction::Followed => reminders.mark_followed(today),
    }
    router.store().save_health_reminders(&reminders)?;

    let by_kind: BTreeMap<&str, Reminder> = reminders
        .iter()
        .map(|(kind, reminder)| (kind.as_str(), reminder))
        .collect();
    let stats = reminders.stats();
    print_json(&json!({
        "reminders": by_kind,
        "stats": stats,
        "healthScore": stats.health_score(),
    }))
}

//! Browser lifecycle events, driven by hand.

use std::sync::Arc;
use std::time::Duration;

use argon_core::router::{LoadStatus, TabId};
use argon_core::{
    ActiveTab, Alarm, Clock, Database, Event, EventRouter, Navigation, TabUpdate, Visibility,
};
use serde_json::json;
use tracing::warn;

use super::{open_router, print_json, CmdResult};

/// How often `watch` checks for due health reminders.
const REMINDER_CHECK: Duration = Duration::from_secs(60);

pub fn install() -> CmdResult {
    let router = open_router()?;
    let seeded = router.on_installed()?;
    let keys: Vec<&str> = seeded.iter().map(|k| k.as_str()).collect();
    print_json(&json!({ "seeded": keys }))
}

pub fn message(raw: &str) -> CmdResult {
    let router = open_router()?;
    let message: serde_json::Value = serde_json::from_str(raw)?;
    print_json(&router.handle_json(&message)?)
}

pub fn navigate(tab_id: TabId, url: &str) -> CmdResult {
    let router = open_router()?;
    print_json(&router.on_before_navigate(&Navigation {
        tab_id,
        frame_id: 0,
        url: url.to_string(),
    }))
}

pub fn activate(tab_id: TabId, url: &str) -> CmdResult {
    let router = open_router()?;
    print_json(&router.on_tab_activated(tab_id, Some(url)))
}

pub fn updated(tab_id: TabId, url: &str) -> CmdResult {
    let router = open_router()?;
    print_json(&router.on_tab_updated(&TabUpdate {
        tab_id,
        url: url.to_string(),
        status: LoadStatus::Complete,
        url_changed: true,
    }))
}

pub fn tick(url: &str, hidden: bool, unknown: bool) -> CmdResult {
    let visibility = match (hidden, unknown) {
        (_, true) => Visibility::Unknown,
        (true, false) => Visibility::Hidden,
        (false, false) => Visibility::Visible,
    };
    let router = open_router()?;
    print_json(&router.on_tick(Some(&ActiveTab {
        url: url.to_string(),
        visibility,
    }))?)
}

/// Run the screen-time and reminder alarms against one visible tab, then
/// print the day's screen time.
pub fn watch(url: &str, seconds: u64) -> CmdResult {
    let router = Arc::new(open_router()?);
    router.on_installed()?;
    let tab = ActiveTab {
        url: url.to_string(),
        visibility: Visibility::Visible,
    };
    let tick_every = Duration::from_millis(router.config().tracking.tick_interval_ms);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(async {
        let ticker = Arc::clone(&router);
        let mut tracker = Alarm::every("screenTimeTracker", tick_every, move || {
            if let Err(e) = ticker.on_tick(Some(&tab)) {
                warn!(error = %e, "screen time tick failed");
            }
        });
        let checker = Arc::clone(&router);
        let mut reminders = Alarm::every("healthReminders", REMINDER_CHECK, move || {
            for event in due_reminders(&checker) {
                if let Ok(line) = serde_json::to_string(&event) {
                    println!("{line}");
                }
            }
        });
        tokio::time::sleep(Duration::from_secs(seconds)).await;
        tracker.cancel();
        reminders.cancel();
    });

    print_json(&router.screen_time()?)
}

fn due_reminders(router: &EventRouter<Database>) -> Vec<Event> {
    let clock = router.clock();
    let today = clock.today();
    let result = router.store().health_reminders(today).and_then(|mut reminders| {
        let events = reminders.due(clock.now_ms(), today);
        if !events.is_empty() {
            router.store().save_health_reminders(&reminders)?;
        }
        Ok(events)
    });
    result.unwrap_or_else(|e| {
        warn!(error = %e, "could not check health reminders");
        Vec::new()
    })
}

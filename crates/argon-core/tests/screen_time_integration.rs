//! Integration tests for screen-time accounting across ticks and days.

use std::sync::Arc;

use argon_core::clock::{Clock, ManualClock};
use argon_core::router::{ActiveTab, EventRouter, TickOutcome, Visibility};
use argon_core::storage::{Config, MemoryStore};
use argon_core::usage::{top_sites, weekly_summary, HISTORY_DAYS};
use chrono::{Duration, NaiveDate};

fn visible(url: &str) -> ActiveTab {
    ActiveTab {
        url: url.to_string(),
        visibility: Visibility::Visible,
    }
}

fn setup() -> (EventRouter<MemoryStore>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::at(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        23,
    ));
    let router = EventRouter::new(MemoryStore::new(), clock.clone(), Config::default());
    router.on_installed().unwrap();
    (router, clock)
}

#[test]
fn test_ticks_attribute_to_sites_and_hours() {
    let (router, clock) = setup();
    for _ in 0..3 {
        router.on_tick(Some(&visible("https://docs.rs/serde"))).unwrap();
        clock.advance(Duration::seconds(1));
    }
    router.on_tick(Some(&visible("https://www.rust-lang.org/"))).unwrap();

    let state = router.screen_time().unwrap();
    assert_eq!(state.today_seconds(), 4);
    assert_eq!(state.hourly_series().iter().sum::<u64>(), 4);
    assert_eq!(state.hourly_series()[23], 4);

    let top = top_sites(&state, 5);
    assert_eq!(top[0].domain, "docs.rs");
    assert_eq!(top[0].time_spent, 3);
    assert_eq!(top[1].domain, "rust-lang.org");
}

#[test]
fn test_unknown_visibility_skips_tick() {
    let (router, _) = setup();
    let tab = ActiveTab {
        url: "https://docs.rs".to_string(),
        visibility: Visibility::Unknown,
    };
    assert_eq!(
        router.on_tick(Some(&tab)).unwrap(),
        TickOutcome::VisibilityUnknown
    );
    assert_eq!(router.screen_time().unwrap().today_seconds(), 0);
}

#[test]
fn test_midnight_rollover_archives_previous_day() {
    let (router, clock) = setup();
    for _ in 0..10 {
        router.on_tick(Some(&visible("https://docs.rs"))).unwrap();
    }
    clock.advance(Duration::hours(1));
    router.on_tick(Some(&visible("https://docs.rs"))).unwrap();

    let state = router.screen_time().unwrap();
    let jan1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    assert_eq!(state.today_seconds(), 1);
    assert_eq!(state.weekly_history().get(&jan1), Some(&10));
    let docs = state.site("docs.rs").unwrap();
    assert_eq!(docs.today_seconds, 1);
    assert_eq!(docs.total_seconds, 11);
}

#[test]
fn test_history_keeps_only_the_last_week() {
    let (router, clock) = setup();
    for _ in 0..12 {
        router.on_tick(Some(&visible("https://docs.rs"))).unwrap();
        clock.advance(Duration::days(1));
    }

    let today = clock.local_now().date();
    let state = router.screen_time().unwrap();
    let history = state.weekly_history();
    assert!(history.len() as i64 <= HISTORY_DAYS);
    assert!(history
        .keys()
        .all(|day| *day >= today - Duration::days(HISTORY_DAYS) && *day < today));

    let summary = weekly_summary(&state, today);
    assert_eq!(summary.days.len(), 7);
    assert_eq!(summary.days.last().unwrap().date, today);
    assert_eq!(summary.total_seconds, 6);
}

#[test]
fn test_reading_on_a_new_day_does_not_lose_data() {
    let (router, clock) = setup();
    router.on_tick(Some(&visible("https://docs.rs"))).unwrap();
    clock.advance(Duration::days(1));

    // Readers see the rolled-over view without writing it.
    assert_eq!(router.screen_time().unwrap().today_seconds(), 0);
    assert_eq!(router.screen_time().unwrap().weekly_history().len(), 1);

    router.on_tick(Some(&visible("https://docs.rs"))).unwrap();
    let state = router.screen_time().unwrap();
    assert_eq!(state.weekly_history().values().sum::<u64>(), 1);
    assert_eq!(state.today_seconds(), 1);
}

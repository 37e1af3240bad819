//! Persistent screen-time aggregate and its day rollover.
//!
//! The record is partitioned by device-local calendar day. Rollover is lazy:
//! whichever reader or writer first observes `last_updated != today` archives
//! the finished day and resets the per-day counters. [`ScreenTimeState::roll_over`]
//! is the only place this transition happens.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, info};

use crate::domain::favicon_for;

/// Days of archived totals kept in `weekly_history`.
pub const HISTORY_DAYS: i64 = 7;

/// Hour of the local day, serialized as a zero-padded string (`"00"`..`"23"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HourOfDay(u8);

impl HourOfDay {
    pub fn new(hour: u32) -> Option<Self> {
        u8::try_from(hour).ok().filter(|h| *h < 24).map(Self)
    }

    pub fn of(time: NaiveDateTime) -> Self {
        // `hour()` is always < 24.
        Self(time.hour() as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for HourOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl Serialize for HourOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HourOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<u32>()
            .ok()
            .and_then(HourOfDay::new)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hour of day: {raw}")))
    }
}

/// Per-site usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteUsage {
    /// Lifetime accumulator; survives rollover.
    #[serde(default)]
    pub total_seconds: u64,
    /// Reset on every rollover.
    #[serde(default)]
    pub today_seconds: u64,
    #[serde(default)]
    pub favicon: String,
}

/// The `screenTimeData` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenTimeState {
    #[serde(default)]
    today_seconds: u64,
    last_updated: NaiveDate,
    #[serde(default)]
    site_tracking: BTreeMap<String, SiteUsage>,
    #[serde(default)]
    hourly_data: BTreeMap<HourOfDay, u64>,
    #[serde(default)]
    weekly_history: BTreeMap<NaiveDate, u64>,
}

impl ScreenTimeState {
    /// Empty record for `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today_seconds: 0,
            last_updated: today,
            site_tracking: BTreeMap::new(),
            hourly_data: BTreeMap::new(),
            weekly_history: BTreeMap::new(),
        }
    }

    pub fn today_seconds(&self) -> u64 {
        self.today_seconds
    }

    pub fn last_updated(&self) -> NaiveDate {
        self.last_updated
    }

    pub fn site(&self, domain: &str) -> Option<&SiteUsage> {
        self.site_tracking.get(domain)
    }

    pub fn sites(&self) -> impl Iterator<Item = (&str, &SiteUsage)> {
        self.site_tracking.iter().map(|(d, u)| (d.as_str(), u))
    }

    pub fn hourly(&self, hour: HourOfDay) -> u64 {
        self.hourly_data.get(&hour).copied().unwrap_or(0)
    }

    /// Seconds per hour for the current day, index = hour.
    pub fn hourly_series(&self) -> [u64; 24] {
        let mut series = [0; 24];
        for (hour, seconds) in &self.hourly_data {
            series[usize::from(hour.get())] = *seconds;
        }
        series
    }

    pub fn weekly_history(&self) -> &BTreeMap<NaiveDate, u64> {
        &self.weekly_history
    }

    /// Archive the finished day and reset per-day counters if `today` differs
    /// from `last_updated`. Idempotent; returns whether a rollover happened.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.last_updated == today {
            return false;
        }

        let finished = self.last_updated;
        if self.today_seconds > 0 {
            self.weekly_history.insert(finished, self.today_seconds);
        }
        let cutoff = today - Duration::days(HISTORY_DAYS);
        self.weekly_history
            .retain(|day, _| *day >= cutoff && *day < today);

        self.today_seconds = 0;
        self.hourly_data.clear();
        for usage in self.site_tracking.values_mut() {
            usage.today_seconds = 0;
        }
        self.last_updated = today;

        info!(%finished, %today, archived = self.weekly_history.len(), "screen time rolled over");
        true
    }

    /// Credit one active second at local time `now` to the day, the hour and,
    /// when `domain` is non-empty, to that site.
    pub fn record_active_second(&mut self, domain: &str, now: NaiveDateTime) {
        self.roll_over(now.date());

        self.today_seconds += 1;
        *self.hourly_data.entry(HourOfDay::of(now)).or_insert(0) += 1;

        if !domain.is_empty() {
            let usage = self
                .site_tracking
                .entry(domain.to_string())
                .or_insert_with(|| SiteUsage {
                    favicon: favicon_for(domain),
                    ..SiteUsage::default()
                });
            usage.total_seconds += 1;
            usage.today_seconds += 1;
        }
        debug!(domain, today = self.today_seconds, "active second recorded");
    }
}

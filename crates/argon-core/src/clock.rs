//! Wall-clock abstraction.
//!
//! Every handler reads the time through a [`Clock`] so that day rollover and
//! allow expiry can be driven deterministically in tests and simulations.
//! Day markers are device-local calendar dates.

use std::sync::Mutex;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, Timelike};

pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;

    /// Device-local wall time.
    fn local_now(&self) -> NaiveDateTime;

    /// Day marker for the current local date.
    fn today(&self) -> NaiveDate {
        self.local_now().date()
    }

    /// Local hour of day, 0..=23.
    fn hour(&self) -> u32 {
        self.local_now().hour()
    }
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
    }

    fn local_now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to.
///
/// The wall time is interpreted as local time; `now_ms` is derived from it as
/// if the local zone were UTC, which keeps the two views consistent.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Start at midnight of the given date plus `hour` hours.
    pub fn at(date: NaiveDate, hour: u32) -> Self {
        let start = date.and_hms_opt(hour.min(23), 0, 0).unwrap_or_default();
        Self::new(start)
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    pub fn set(&self, to: NaiveDateTime) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = to;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.local_now().and_utc().timestamp_millis()).unwrap_or_default()
    }

    fn local_now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_across_midnight() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let clock = ManualClock::at(day, 23);
        assert_eq!(clock.today(), day);
        assert_eq!(clock.hour(), 23);

        let before = clock.now_ms();
        clock.advance(Duration::hours(1));
        assert_eq!(clock.today(), day.succ_opt().unwrap());
        assert_eq!(clock.hour(), 0);
        assert_eq!(clock.now_ms() - before, 3_600_000);
    }

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now_ms() > 1_577_836_800_000);
    }
}

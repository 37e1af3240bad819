use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Completed work sessions a day needs for a full productivity score.
pub const TARGET_SESSIONS_PER_DAY: u32 = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStats {
    #[serde(default)]
    pub completed_sessions: u32,
    /// Minutes.
    #[serde(default)]
    pub total_focus_time: u32,
}

impl DayStats {
    /// `min(100, round(completed / 8 * 100))`.
    pub fn productivity_score(&self) -> u32 {
        let score = (f64::from(self.completed_sessions) / f64::from(TARGET_SESSIONS_PER_DAY)
            * 100.0)
            .round();
        (score as u32).min(100)
    }
}

/// The `pomodoroStats` record: one entry per day with completed work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PomodoroStats {
    days: BTreeMap<NaiveDate, DayStats>,
}

impl PomodoroStats {
    pub fn day(&self, day: NaiveDate) -> DayStats {
        self.days.get(&day).copied().unwrap_or_default()
    }

    pub fn record_session(&mut self, day: NaiveDate, focus_minutes: u32) -> DayStats {
        let entry = self.days.entry(day).or_default();
        entry.completed_sessions += 1;
        entry.total_focus_time += focus_minutes;
        *entry
    }

    pub fn days(&self) -> impl Iterator<Item = (NaiveDate, DayStats)> + '_ {
        self.days.iter().map(|(d, s)| (*d, *s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn sessions_accumulate_per_day() {
        let mut stats = PomodoroStats::default();
        stats.record_session(day(1), 25);
        stats.record_session(day(1), 25);
        stats.record_session(day(2), 50);

        assert_eq!(
            stats.day(day(1)),
            DayStats {
                completed_sessions: 2,
                total_focus_time: 50
            }
        );
        assert_eq!(stats.day(day(2)).total_focus_time, 50);
        assert_eq!(stats.day(day(3)), DayStats::default());
    }

    #[test]
    fn productivity_score_caps_at_100() {
        let score = |n| {
            DayStats {
                completed_sessions: n,
                total_focus_time: 0,
            }
            .productivity_score()
        };
        assert_eq!(score(0), 0);
        assert_eq!(score(1), 13);
        assert_eq!(score(4), 50);
        assert_eq!(score(8), 100);
        assert_eq!(score(12), 100);
    }

    #[test]
    fn stored_as_day_keyed_object() {
        let mut stats = PomodoroStats::default();
        stats.record_session(day(5), 25);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["2024-03-05"]["completedSessions"], 1);
        assert_eq!(json["2024-03-05"]["totalFocusTime"], 25);
    }
}

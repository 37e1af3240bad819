//! Read-side views over [`ScreenTimeState`] for the popup and dashboard.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::state::{ScreenTimeState, HISTORY_DAYS};
use crate::domain::favicon_for;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopSite {
    pub domain: String,
    /// Seconds spent today.
    pub time_spent: u64,
    pub favicon: String,
}

/// Sites ordered by today's usage, most used first. Ties go alphabetically.
pub fn top_sites(state: &ScreenTimeState, limit: usize) -> Vec<TopSite> {
    let mut sites: Vec<TopSite> = state
        .sites()
        .map(|(domain, usage)| TopSite {
            domain: domain.to_string(),
            time_spent: usage.today_seconds,
            favicon: if usage.favicon.is_empty() {
                favicon_for(domain)
            } else {
                usage.favicon.clone()
            },
        })
        .collect();
    sites.sort_by(|a, b| {
        b.time_spent
            .cmp(&a.time_spent)
            .then_with(|| a.domain.cmp(&b.domain))
    });
    sites.truncate(limit);
    sites
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayTotal {
    pub date: NaiveDate,
    pub seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    /// Oldest first, ending with `today`.
    pub days: Vec<DayTotal>,
    pub total_seconds: u64,
    pub average_seconds: u64,
}

/// The seven days ending with `today`, zero-filled where nothing was archived.
///
/// `state` should already be rolled over to `today`; if it is not, its
/// current counter is reported under its own day marker.
pub fn weekly_summary(state: &ScreenTimeState, today: NaiveDate) -> WeeklySummary {
    let days: Vec<DayTotal> = (0..HISTORY_DAYS)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            let seconds = if date == state.last_updated() {
                state.today_seconds()
            } else {
                state.weekly_history().get(&date).copied().unwrap_or(0)
            };
            DayTotal { date, seconds }
        })
        .collect();
    let total_seconds: u64 = days.iter().map(|d| d.seconds).sum();
    WeeklySummary {
        average_seconds: total_seconds / days.len().max(1) as u64,
        days,
        total_seconds,
    }
}

/// `"45 sec"`, `"12 min"`, `"2 hr"`, `"2 hr 30 min"`.
pub fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{seconds} sec");
    }
    if seconds < 3600 {
        return format!("{} min", seconds / 60);
    }
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if minutes == 0 {
        format!("{hours} hr")
    } else {
        format!("{hours} hr {minutes} min")
    }
}

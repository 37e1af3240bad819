use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Minutes credited as "saved" for each intervention.
pub const MINUTES_SAVED_PER_INTERVENTION: u64 = 5;

/// The `doomStats` record.
///
/// `streak` counts consecutive days that each had at least one
/// intervention. It rolls over lazily, like screen time: the first read or
/// write on a new day looks at the finished day and either extends or
/// breaks the streak.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoomStats {
    #[serde(default)]
    interventions_today: u32,
    /// Minutes.
    #[serde(default)]
    time_saved: u64,
    #[serde(default)]
    streak: u32,
    #[serde(default)]
    last_update: NaiveDate,
}

impl DoomStats {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            interventions_today: 0,
            time_saved: 0,
            streak: 0,
            last_update: today,
        }
    }

    pub fn interventions_today(&self) -> u32 {
        self.interventions_today
    }

    pub fn time_saved(&self) -> u64 {
        self.time_saved
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn last_update(&self) -> NaiveDate {
        self.last_update
    }

    /// Close out the previous day if `today` is a new one. Idempotent.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.last_update == today {
            return false;
        }
        let consecutive = self.last_update.succ_opt() == Some(today);
        if consecutive && self.interventions_today > 0 {
            self.streak += 1;
        } else {
            self.streak = 0;
        }
        self.interventions_today = 0;
        self.last_update = today;
        true
    }

    pub fn record_intervention(&mut self, today: NaiveDate, minutes_saved: u64) {
        self.roll_over(today);
        self.interventions_today += 1;
        self.time_saved = self.time_saved.saturating_add(minutes_saved);
        info!(
            today = self.interventions_today,
            streak = self.streak,
            "doom scroll intervention recorded"
        );
    }
}

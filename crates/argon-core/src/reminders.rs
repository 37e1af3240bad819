//! Health reminder scheduling.
//!
//! Each reminder kind carries an interval and, while enabled, the epoch
//! millisecond at which it is next due. Hosts call [`HealthReminders::due`]
//! from a periodic alarm; due reminders fire once and re-arm one interval
//! later. Missed deadlines are not caught up.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ValidationError;
use crate::events::{timestamp, Event};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    Posture,
    Hydration,
    Eye,
    Movement,
    Breathing,
    Screen,
}

impl ReminderKind {
    pub const ALL: [ReminderKind; 6] = [
        ReminderKind::Posture,
        ReminderKind::Hydration,
        ReminderKind::Eye,
        ReminderKind::Movement,
        ReminderKind::Breathing,
        ReminderKind::Screen,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReminderKind::Posture => "posture",
            ReminderKind::Hydration => "hydration",
            ReminderKind::Eye => "eye",
            ReminderKind::Movement => "movement",
            ReminderKind::Breathing => "breathing",
            ReminderKind::Screen => "screen",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ReminderKind::Posture => "Posture Check",
            ReminderKind::Hydration => "Drink Water",
            ReminderKind::Eye => "Eye Break (20-20-20)",
            ReminderKind::Movement => "Take a Walk",
            ReminderKind::Breathing => "Deep Breathing",
            ReminderKind::Screen => "Screen Break",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ReminderKind::Posture => {
                "Time to check your posture! Sit up straight and align your spine."
            }
            ReminderKind::Hydration => "Stay hydrated! Time to drink some water.",
            ReminderKind::Eye => {
                "Look at something 20 feet away for 20 seconds to rest your eyes."
            }
            ReminderKind::Movement => "Get up and move around for better circulation!",
            ReminderKind::Breathing => "Take 5 deep breaths to reduce stress and improve focus.",
            ReminderKind::Screen => "Step away from your screen for a few minutes.",
        }
    }

    fn default_reminder(self) -> Reminder {
        let (interval, unit) = match self {
            ReminderKind::Posture => (30, IntervalUnit::Minutes),
            ReminderKind::Hydration => (45, IntervalUnit::Minutes),
            ReminderKind::Eye => (20, IntervalUnit::Minutes),
            ReminderKind::Movement => (60, IntervalUnit::Minutes),
            ReminderKind::Breathing => (90, IntervalUnit::Minutes),
            ReminderKind::Screen => (2, IntervalUnit::Hours),
        };
        Reminder {
            enabled: false,
            interval,
            unit,
            next_reminder: None,
        }
    }
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        ReminderKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or(ValidationError::UnknownReminder(s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Minutes,
    Hours,
}

impl IntervalUnit {
    fn millis(self) -> u64 {
        match self {
            IntervalUnit::Minutes => 60_000,
            IntervalUnit::Hours => 3_600_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub enabled: bool,
    pub interval: u32,
    pub unit: IntervalUnit,
    /// Epoch ms; `None` while disabled.
    #[serde(default)]
    pub next_reminder: Option<u64>,
}

impl Reminder {
    pub fn interval_ms(&self) -> u64 {
        u64::from(self.interval) * self.unit.millis()
    }

    fn schedule(&mut self, now_ms: u64) {
        self.next_reminder = self.enabled.then(|| now_ms + self.interval_ms());
    }
}

/// Daily counters. Reset lazily on the first access of a new day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderStats {
    #[serde(default)]
    pub total_reminders_today: u32,
    #[serde(default)]
    pub reminders_followed: u32,
    pub day: NaiveDate,
}

impl ReminderStats {
    /// Share of today's reminders that were followed, 0..=100.
    pub fn health_score(&self) -> u32 {
        if self.total_reminders_today == 0 {
            return 0;
        }
        let score = f64::from(self.reminders_followed) / f64::from(self.total_reminders_today);
        ((score * 100.0).round() as u32).min(100)
    }
}

/// The `healthReminders` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReminders {
    #[serde(default)]
    reminders: BTreeMap<ReminderKind, Reminder>,
    stats: ReminderStats,
}

impl HealthReminders {
    /// All kinds with their defaults, all disabled.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            reminders: ReminderKind::ALL
                .into_iter()
                .map(|kind| (kind, kind.default_reminder()))
                .collect(),
            stats: ReminderStats {
                total_reminders_today: 0,
                reminders_followed: 0,
                day: today,
            },
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn reminder(&self, kind: ReminderKind) -> Reminder {
        self.reminders
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| kind.default_reminder())
    }

    pub fn iter(&self) -> impl Iterator<Item = (ReminderKind, Reminder)> + '_ {
        ReminderKind::ALL
            .into_iter()
            .map(|kind| (kind, self.reminder(kind)))
    }

    pub fn any_enabled(&self) -> bool {
        self.reminders.values().any(|r| r.enabled)
    }

    pub fn stats(&self) -> &ReminderStats {
        &self.stats
    }

    // ── Commands ─────────────────────────────────────────────────────

    fn entry(&mut self, kind: ReminderKind) -> &mut Reminder {
        self.reminders
            .entry(kind)
            .or_insert_with(|| kind.default_reminder())
    }

    /// Enable (arming `now + interval`) or disable (cancelling). Repeating
    /// either is harmless.
    pub fn toggle(&mut self, kind: ReminderKind, enabled: bool, now_ms: u64) {
        let reminder = self.entry(kind);
        if reminder.enabled == enabled && (enabled == reminder.next_reminder.is_some()) {
            return;
        }
        reminder.enabled = enabled;
        reminder.schedule(now_ms);
        info!(%kind, enabled, "health reminder toggled");
    }

    pub fn toggle_all(&mut self, enabled: bool, now_ms: u64) {
        for kind in ReminderKind::ALL {
            self.toggle(kind, enabled, now_ms);
        }
    }

    /// Change the interval; an enabled reminder is re-armed from `now`.
    pub fn set_interval(
        &mut self,
        kind: ReminderKind,
        interval: u32,
        now_ms: u64,
    ) -> Result<(), ValidationError> {
        if interval < 1 {
            return Err(ValidationError::InvalidInterval(interval));
        }
        let reminder = self.entry(kind);
        reminder.interval = interval;
        reminder.schedule(now_ms);
        Ok(())
    }

    pub fn set_unit(&mut self, kind: ReminderKind, unit: IntervalUnit, now_ms: u64) {
        let reminder = self.entry(kind);
        reminder.unit = unit;
        reminder.schedule(now_ms);
    }

    /// Reset the daily counters if `today` is a new day. Idempotent.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.stats.day == today {
            return false;
        }
        self.stats = ReminderStats {
            total_reminders_today: 0,
            reminders_followed: 0,
            day: today,
        };
        true
    }

    /// Fire every enabled reminder whose deadline has passed and re-arm it
    /// one interval from `now`.
    pub fn due(&mut self, now_ms: u64, today: NaiveDate) -> Vec<Event> {
        self.roll_over(today);
        let mut fired = Vec::new();
        for kind in ReminderKind::ALL {
            let reminder = self.entry(kind);
            let Some(deadline) = reminder.next_reminder.filter(|_| reminder.enabled) else {
                continue;
            };
            if deadline > now_ms {
                continue;
            }
            reminder.schedule(now_ms);
            debug!(%kind, next = ?reminder.next_reminder, "health reminder due");
            fired.push(Event::ReminderDue {
                kind,
                title: kind.title().to_string(),
                message: kind.message().to_string(),
                at: timestamp(now_ms),
            });
        }
        self.stats.total_reminders_today += fired.len() as u32;
        fired
    }

    pub fn mark_followed(&mut self, today: NaiveDate) {
        self.roll_over(today);
        self.stats.reminders_followed += 1;
    }
}

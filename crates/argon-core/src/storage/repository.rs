//! Typed access to every persisted record.
//!
//! Each getter reads straight from the backing store, so a handler that
//! starts by calling them always sees the latest persisted state. Missing
//! records come back as their defaults; nothing is cached in between.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use super::{load, save, KvStore, StorageKey};
use crate::blocking::{BlockCounts, BlockList, TemporaryAllowRegistry};
use crate::doom::{DoomSiteList, DoomStats};
use crate::error::StorageError;
use crate::reminders::HealthReminders;
use crate::timer::{PomodoroSettings, PomodoroStats, PomodoroTimer};
use crate::usage::ScreenTimeState;

pub struct ExtensionStore<S> {
    store: S,
}

impl<S: KvStore> ExtensionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    fn load_or<T, F>(&self, key: StorageKey, default: F) -> Result<T, StorageError>
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        Ok(load(&self.store, key)?.unwrap_or_else(default))
    }

    fn save<T: Serialize>(&self, key: StorageKey, value: &T) -> Result<(), StorageError> {
        save(&self.store, key, value)
    }

    /// Write defaults for records that do not exist yet. Returns the keys
    /// that were seeded; existing user data is never touched.
    pub fn seed_defaults(&self, today: NaiveDate) -> Result<Vec<StorageKey>, StorageError> {
        let mut seeded = Vec::new();
        if self.store.get(StorageKey::BlockedSites.as_str())?.is_none() {
            self.save_blocked_sites(&BlockList::default())?;
            seeded.push(StorageKey::BlockedSites);
        }
        if self.store.get(StorageKey::IsEnabled.as_str())?.is_none() {
            self.set_enabled(true)?;
            seeded.push(StorageKey::IsEnabled);
        }
        if self.store.get(StorageKey::ScreenTimeData.as_str())?.is_none() {
            self.save_screen_time(&ScreenTimeState::new(today))?;
            seeded.push(StorageKey::ScreenTimeData);
        }
        if self.store.get(StorageKey::DoomBlockedSites.as_str())?.is_none() {
            self.save_doom_sites(&DoomSiteList::default())?;
            seeded.push(StorageKey::DoomBlockedSites);
        }
        if !seeded.is_empty() {
            info!(?seeded, "seeded default records");
        }
        Ok(seeded)
    }

    // ── Blocking ─────────────────────────────────────────────────────

    pub fn blocked_sites(&self) -> Result<BlockList, StorageError> {
        self.load_or(StorageKey::BlockedSites, BlockList::default)
    }

    pub fn save_blocked_sites(&self, list: &BlockList) -> Result<(), StorageError> {
        self.save(StorageKey::BlockedSites, list)
    }

    pub fn is_enabled(&self) -> Result<bool, StorageError> {
        self.load_or(StorageKey::IsEnabled, || true)
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<(), StorageError> {
        self.save(StorageKey::IsEnabled, &enabled)
    }

    pub fn temporary_allowed(&self) -> Result<TemporaryAllowRegistry, StorageError> {
        self.load_or(StorageKey::TemporaryAllowed, TemporaryAllowRegistry::new)
    }

    pub fn save_temporary_allowed(
        &self,
        registry: &TemporaryAllowRegistry,
    ) -> Result<(), StorageError> {
        self.save(StorageKey::TemporaryAllowed, registry)
    }

    pub fn block_counts(&self) -> Result<BlockCounts, StorageError> {
        self.load_or(StorageKey::BlockCounts, BlockCounts::default)
    }

    pub fn save_block_counts(&self, counts: &BlockCounts) -> Result<(), StorageError> {
        self.save(StorageKey::BlockCounts, counts)
    }

    // ── Screen time ──────────────────────────────────────────────────

    /// The screen-time record as of `today`, rolled over if a day boundary
    /// has passed since it was written.
    pub fn screen_time(&self, today: NaiveDate) -> Result<ScreenTimeState, StorageError> {
        let mut state = self.load_or(StorageKey::ScreenTimeData, || ScreenTimeState::new(today))?;
        state.roll_over(today);
        Ok(state)
    }

    pub fn save_screen_time(&self, state: &ScreenTimeState) -> Result<(), StorageError> {
        self.save(StorageKey::ScreenTimeData, state)
    }

    // ── Doom scroll ──────────────────────────────────────────────────

    pub fn doom_sites(&self) -> Result<DoomSiteList, StorageError> {
        self.load_or(StorageKey::DoomBlockedSites, DoomSiteList::default)
    }

    pub fn save_doom_sites(&self, sites: &DoomSiteList) -> Result<(), StorageError> {
        self.save(StorageKey::DoomBlockedSites, sites)
    }

    pub fn doom_stats(&self, today: NaiveDate) -> Result<DoomStats, StorageError> {
        let mut stats = self.load_or(StorageKey::DoomStats, || DoomStats::new(today))?;
        stats.roll_over(today);
        Ok(stats)
    }

    pub fn save_doom_stats(&self, stats: &DoomStats) -> Result<(), StorageError> {
        self.save(StorageKey::DoomStats, stats)
    }

    // ── Pomodoro ─────────────────────────────────────────────────────

    pub fn pomodoro_settings(&self) -> Result<PomodoroSettings, StorageError> {
        self.load_or(StorageKey::PomodoroSettings, PomodoroSettings::default)
    }

    pub fn save_pomodoro_settings(&self, settings: &PomodoroSettings) -> Result<(), StorageError> {
        self.save(StorageKey::PomodoroSettings, settings)
    }

    pub fn pomodoro_stats(&self) -> Result<PomodoroStats, StorageError> {
        self.load_or(StorageKey::PomodoroStats, PomodoroStats::default)
    }

    pub fn save_pomodoro_stats(&self, stats: &PomodoroStats) -> Result<(), StorageError> {
        self.save(StorageKey::PomodoroStats, stats)
    }

    pub fn pomodoro_timer(
        &self,
        settings: &PomodoroSettings,
    ) -> Result<PomodoroTimer, StorageError> {
        self.load_or(StorageKey::PomodoroTimer, || PomodoroTimer::new(settings))
    }

    pub fn save_pomodoro_timer(&self, timer: &PomodoroTimer) -> Result<(), StorageError> {
        self.save(StorageKey::PomodoroTimer, timer)
    }

    // ── Health reminders ─────────────────────────────────────────────

    pub fn health_reminders(&self, today: NaiveDate) -> Result<HealthReminders, StorageError> {
        let mut reminders =
            self.load_or(StorageKey::HealthReminders, || HealthReminders::new(today))?;
        reminders.roll_over(today);
        Ok(reminders)
    }

    pub fn save_health_reminders(&self, reminders: &HealthReminders) -> Result<(), StorageError> {
        self.save(StorageKey::HealthReminders, reminders)
    }
}

mod config;
pub mod database;
mod memory;
mod repository;

pub use config::{BlockingConfig, Config, DoomConfig, TrackingConfig};
pub use database::Database;
pub use memory::MemoryStore;
pub use repository::ExtensionStore;

use std::fmt;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ConfigError, StorageError};

/// Returns the data directory, creating it when missing.
///
/// `ARGON_DATA_DIR` wins when set. Otherwise `~/.config/argon`, or
/// `~/.config/argon-dev` with `ARGON_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("ARGON_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("ARGON_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("argon-dev")
            } else {
                base_dir.join("argon")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Key/value storage shared by every handler.
///
/// Writes are last-writer-wins per key. Callers load, mutate and save
/// without any cross-handler locking.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;
    fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KvStore + ?Sized> KvStore for &S {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

impl<S: KvStore + ?Sized> KvStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Every key the extension persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    BlockedSites,
    IsEnabled,
    ScreenTimeData,
    TemporaryAllowed,
    BlockCounts,
    DoomBlockedSites,
    DoomStats,
    PomodoroSettings,
    PomodoroStats,
    PomodoroTimer,
    HealthReminders,
}

impl StorageKey {
    pub const ALL: [StorageKey; 11] = [
        StorageKey::BlockedSites,
        StorageKey::IsEnabled,
        StorageKey::ScreenTimeData,
        StorageKey::TemporaryAllowed,
        StorageKey::BlockCounts,
        StorageKey::DoomBlockedSites,
        StorageKey::DoomStats,
        StorageKey::PomodoroSettings,
        StorageKey::PomodoroStats,
        StorageKey::PomodoroTimer,
        StorageKey::HealthReminders,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::BlockedSites => "blockedSites",
            StorageKey::IsEnabled => "isEnabled",
            StorageKey::ScreenTimeData => "screenTimeData",
            StorageKey::TemporaryAllowed => "temporaryAllowed",
            StorageKey::BlockCounts => "blockCounts",
            StorageKey::DoomBlockedSites => "doomblockedsites",
            StorageKey::DoomStats => "doomStats",
            StorageKey::PomodoroSettings => "pomodoroSettings",
            StorageKey::PomodoroStats => "pomodoroStats",
            StorageKey::PomodoroTimer => "pomodoroTimer",
            StorageKey::HealthReminders => "healthReminders",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read and decode a typed value. Missing keys and JSON `null` are `None`.
pub fn load<T, S>(store: &S, key: StorageKey) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
    S: KvStore + ?Sized,
{
    match store.get(key.as_str())? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| StorageError::Decode {
                key: key.to_string(),
                message: e.to_string(),
            }),
    }
}

/// Encode and write a typed value.
pub fn save<T, S>(store: &S, key: StorageKey, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
    S: KvStore + ?Sized,
{
    let value = serde_json::to_value(value).map_err(|e| StorageError::Encode {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    store.set(key.as_str(), value)
}

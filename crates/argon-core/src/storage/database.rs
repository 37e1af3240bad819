//! SQLite-backed key/value store.
//!
//! Values are stored as JSON text in a single `kv` table, so every
//! [`StorageKey`](super::StorageKey) survives restarts of the host.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection};
use serde_json::Value;

use super::{data_dir, KvStore};
use crate::error::{CoreError, StorageError};

/// SQLite database holding extension state.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database at `<data dir>/argon.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory is unusable or the database
    /// cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("argon.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|e| StorageError::OpenFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn().execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a raw value from the kv table.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a raw value in the kv table.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn().execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// All keys currently stored, sorted.
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut keys = Vec::new();
        for key in rows {
            keys.push(key?);
        }
        Ok(keys)
    }
}

impl KvStore for Database {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        match self.kv_get(key)? {
            None => Ok(None),
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| StorageError::Decode {
                    key: key.to_string(),
                    message: e.to_string(),
                }),
        }
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.kv_set(key, &value.to_string())?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.conn()
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
    }

    #[test]
    fn json_values_round_trip() {
        let db = Database::open_memory().unwrap();
        let value = json!({ "todaySeconds": 12, "siteTracking": {} });
        db.set("screenTimeData", value.clone()).unwrap();
        assert_eq!(db.get("screenTimeData").unwrap(), Some(value));

        db.remove("screenTimeData").unwrap();
        assert!(db.get("screenTimeData").unwrap().is_none());
    }

    #[test]
    fn corrupt_text_is_a_decode_error() {
        let db = Database::open_memory().unwrap();
        db.kv_set("isEnabled", "{not json").unwrap();
        assert!(matches!(
            db.get("isEnabled"),
            Err(StorageError::Decode { .. })
        ));
    }

    #[test]
    fn file_database_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("argon.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.set("isEnabled", json!(false)).unwrap();
            db.set("blockedSites", json!(["example.com"])).unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.get("isEnabled").unwrap(), Some(json!(false)));
        assert_eq!(db.keys().unwrap(), vec!["blockedSites", "isEnabled"]);
    }
}

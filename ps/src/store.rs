//! Core Store implementation

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;
use tracing::{debug, info};

use crate::Record;

/// Errors produced by the store
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with the given id exists in the collection
    #[error("record not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// Underlying SQLite failure
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Record payload failed to (de)serialize
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Store directory could not be created
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A value mirrored into the index table
#[derive(Debug, Clone, PartialEq)]
pub enum IndexValue {
    String(String),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for IndexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{}", s),
            Self::Int(i) => write!(f, "{}", i),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// A raw row, used by the inspection CLI where the record type is unknown
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub id: String,
    pub data: String,
    pub updated_at: i64,
}

/// The record store
///
/// A single SQLite database holds every collection. The connection is
/// guarded by a mutex; callers are expected to issue one operation at a
/// time per session (no cross-record transactions are exposed).
pub struct Store {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl Store {
    /// Open or create a store at the given database path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS records (
                collection TEXT NOT NULL,
                id         TEXT NOT NULL,
                data       TEXT NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (collection, id)
            );
            CREATE TABLE IF NOT EXISTS record_index (
                collection TEXT NOT NULL,
                id         TEXT NOT NULL,
                field      TEXT NOT NULL,
                value      TEXT NOT NULL,
                PRIMARY KEY (collection, id, field)
            );",
        )?;

        debug!(?path, "Opened record store");
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Path to the underlying database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace a record, refreshing its index rows
    pub fn put<R: Record>(&self, record: &R) -> Result<(), StoreError> {
        let collection = R::collection_name();
        let data = serde_json::to_string(record)?;
        debug!(collection, id = record.id(), "Store::put");

        let conn = self.lock();
        conn.execute(
            "INSERT INTO records (collection, id, data, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (collection, id) DO UPDATE SET data = ?3, updated_at = ?4",
            params![collection, record.id(), data, record.updated_at()],
        )?;

        conn.execute(
            "DELETE FROM record_index WHERE collection = ?1 AND id = ?2",
            params![collection, record.id()],
        )?;
        for (field, value) in record.indexed_fields() {
            conn.execute(
                "INSERT INTO record_index (collection, id, field, value) VALUES (?1, ?2, ?3, ?4)",
                params![collection, record.id(), field, value.to_string()],
            )?;
        }

        Ok(())
    }

    /// Fetch a record by id
    pub fn get<R: Record>(&self, id: &str) -> Result<R, StoreError> {
        let collection = R::collection_name();
        debug!(collection, id, "Store::get");

        let conn = self.lock();
        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM records WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()?;

        match data {
            Some(data) => Ok(serde_json::from_str(&data)?),
            None => Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            }),
        }
    }

    /// Check whether a record exists
    pub fn exists<R: Record>(&self, id: &str) -> Result<bool, StoreError> {
        let collection = R::collection_name();
        let conn = self.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM records WHERE collection = ?1 AND id = ?2",
            params![collection, id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// List every record in a collection, most recently updated first
    pub fn list<R: Record>(&self) -> Result<Vec<R>, StoreError> {
        let collection = R::collection_name();
        debug!(collection, "Store::list");

        let conn = self.lock();
        let mut stmt =
            conn.prepare("SELECT data FROM records WHERE collection = ?1 ORDER BY updated_at DESC")?;
        let rows = stmt.query_map(params![collection], |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(serde_json::from_str(&row?)?);
        }
        Ok(records)
    }

    /// Find records whose indexed field matches a value
    pub fn find<R: Record>(&self, field: &str, value: &IndexValue) -> Result<Vec<R>, StoreError> {
        let collection = R::collection_name();
        debug!(collection, field, %value, "Store::find");

        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT r.data FROM records r
             JOIN record_index i ON i.collection = r.collection AND i.id = r.id
             WHERE r.collection = ?1 AND i.field = ?2 AND i.value = ?3
             ORDER BY r.updated_at DESC",
        )?;
        let rows = stmt.query_map(params![collection, field, value.to_string()], |row| {
            row.get::<_, String>(0)
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(serde_json::from_str(&row?)?);
        }
        Ok(records)
    }

    /// Delete a record and its index rows
    pub fn delete<R: Record>(&self, id: &str) -> Result<(), StoreError> {
        self.delete_raw(R::collection_name(), id)
    }

    /// List the collection names present in the store
    pub fn collections(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT DISTINCT collection FROM records ORDER BY collection")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut names = Vec::new();
        for row in rows {
            names.push(row?);
        }
        Ok(names)
    }

    /// List raw rows of a collection (inspection CLI)
    pub fn list_raw(&self, collection: &str) -> Result<Vec<RawRecord>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, data, updated_at FROM records WHERE collection = ?1 ORDER BY updated_at DESC",
        )?;
        let rows = stmt.query_map(params![collection], |row| {
            Ok(RawRecord {
                id: row.get(0)?,
                data: row.get(1)?,
                updated_at: row.get(2)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Fetch a raw row by id (inspection CLI)
    pub fn get_raw(&self, collection: &str, id: &str) -> Result<RawRecord, StoreError> {
        let conn = self.lock();
        let row = conn
            .query_row(
                "SELECT id, data, updated_at FROM records WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| {
                    Ok(RawRecord {
                        id: row.get(0)?,
                        data: row.get(1)?,
                        updated_at: row.get(2)?,
                    })
                },
            )
            .optional()?;

        row.ok_or_else(|| StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        })
    }

    /// Delete a row by collection name and id
    pub fn delete_raw(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let conn = self.lock();
        let deleted = conn.execute(
            "DELETE FROM records WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )?;
        conn.execute(
            "DELETE FROM record_index WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )?;

        if deleted == 0 {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        info!(collection, id, "Deleted record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::now_ms;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Widget {
        id: String,
        label: String,
        status: String,
        updated_at: i64,
    }

    impl Record for Widget {
        fn id(&self) -> &str {
            &self.id
        }

        fn updated_at(&self) -> i64 {
            self.updated_at
        }

        fn collection_name() -> &'static str {
            "widgets"
        }

        fn indexed_fields(&self) -> HashMap<String, IndexValue> {
            let mut fields = HashMap::new();
            fields.insert("status".to_string(), IndexValue::String(self.status.clone()));
            fields
        }
    }

    fn widget(id: &str, status: &str) -> Widget {
        Widget {
            id: id.to_string(),
            label: format!("widget {}", id),
            status: status.to_string(),
            updated_at: now_ms(),
        }
    }

    #[test]
    fn test_put_and_get() {
        let temp = TempDir::new().unwrap();
        let store = Store::open(temp.path().join("test.db")).unwrap();

        let w = widget("w1", "active");
        store.put(&w).unwrap();

        let loaded: Widget = store.get("w1").unwrap();
        assert_eq!(loaded, w);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let temp = TempDir::new().unwrap();
        let store = Store::open(temp.path().join("test.db")).unwrap();

        let result = store.get::<Widget>("nope");
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_put_overwrites() {
        let temp = TempDir::new().unwrap();
        let store = Store::open(temp.path().join("test.db")).unwrap();

        let mut w = widget("w1", "active");
        store.put(&w).unwrap();

        w.label = "renamed".to_string();
        store.put(&w).unwrap();

        let loaded: Widget = store.get("w1").unwrap();
        assert_eq!(loaded.label, "renamed");
        assert_eq!(store.list::<Widget>().unwrap().len(), 1);
    }

    #[test]
    fn test_find_by_indexed_field() {
        let temp = TempDir::new().unwrap();
        let store = Store::open(temp.path().join("test.db")).unwrap();

        store.put(&widget("w1", "active")).unwrap();
        store.put(&widget("w2", "done")).unwrap();
        store.put(&widget("w3", "active")).unwrap();

        let active: Vec<Widget> = store
            .find("status", &IndexValue::String("active".to_string()))
            .unwrap();
        assert_eq!(active.len(), 2);
        assert!(active.iter().all(|w| w.status == "active"));
    }

    #[test]
    fn test_delete() {
        let temp = TempDir::new().unwrap();
        let store = Store::open(temp.path().join("test.db")).unwrap();

        store.put(&widget("w1", "active")).unwrap();
        store.delete::<Widget>("w1").unwrap();

        assert!(!store.exists::<Widget>("w1").unwrap());
        assert!(matches!(
            store.delete::<Widget>("w1"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_collections_and_raw_access() {
        let temp = TempDir::new().unwrap();
        let store = Store::open(temp.path().join("test.db")).unwrap();

        store.put(&widget("w1", "active")).unwrap();

        assert_eq!(store.collections().unwrap(), vec!["widgets".to_string()]);

        let raw = store.get_raw("widgets", "w1").unwrap();
        assert!(raw.data.contains("widget w1"));

        let rows = store.list_raw("widgets").unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_get_observes_prior_writes() {
        let temp = TempDir::new().unwrap();
        let store = Store::open(temp.path().join("test.db")).unwrap();

        let mut w = widget("w1", "active");
        store.put(&w).unwrap();

        for round in 0..5 {
            w.label = format!("round {}", round);
            w.updated_at = now_ms();
            store.put(&w).unwrap();
            let loaded: Widget = store.get("w1").unwrap();
            assert_eq!(loaded.label, w.label);
        }
    }
}

//! ProjectStore - generic persistent record store over SQLite
//!
//! Stores serde-serializable records as JSON rows in a single SQLite
//! database, one logical collection per record type. Records declare a
//! handful of indexed fields that are mirrored into a side table so
//! callers can filter without deserializing every row.
//!
//! # Example
//!
//! ```ignore
//! use projectstore::{Record, Store};
//!
//! let store = Store::open(".projectstore/records.db")?;
//! store.put(&project)?;
//! let project: Project = store.get("proj-0193bfa2c1d4")?;
//! ```

pub mod cli;
pub mod config;
mod store;

pub use store::{IndexValue, Store, StoreError};

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Current Unix timestamp in milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// A persistable record
///
/// Implementors pick their collection name and expose the fields worth
/// indexing. Everything else round-trips through the JSON payload.
pub trait Record: Serialize + DeserializeOwned {
    /// Unique identifier within the collection
    fn id(&self) -> &str;

    /// Last update timestamp (Unix milliseconds)
    fn updated_at(&self) -> i64;

    /// Name of the collection this record lives in
    fn collection_name() -> &'static str;

    /// Fields mirrored into the index table for filtered lookups
    fn indexed_fields(&self) -> HashMap<String, IndexValue> {
        HashMap::new()
    }
}

//! Snapshot Persistence (Save & Load)
//!
//! Whole-database JSON snapshot. Saving writes every table's schema, rows
//! and row-id counter; loading replaces the in-memory table set and
//! rebuilds indexes from the rows. There is no log and no recovery:
//! a snapshot is taken between statements, never during one.
//!
//! ```text
//! {
//!   "version": "1.0.0",
//!   "tables": { "users": { "schema": {..}, "rows": [{"rowId": 1, "data": {..}}], "nextRowId": 2 } },
//!   "createdAt": 1700000000000,
//!   "updatedAt": 1700000000000
//! }
//! ```

use super::core::{now_millis, Database};
use super::table::Table;
use crate::types::{RowId, StoredRow, TableSchema};
use crate::{QuillError, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Snapshot format version written by this build
pub const SNAPSHOT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: String,
    /// Lowercase table name -> table contents
    pub tables: BTreeMap<String, TableSnapshot>,
    pub created_at: u64,
    pub updated_at: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    pub schema: TableSchema,
    pub rows: Vec<StoredRow>,
    pub next_row_id: RowId,
}

impl Database {
    /// Capture the current state as a snapshot document
    pub fn snapshot(&self) -> Snapshot {
        let tables = self
            .tables
            .iter()
            .map(|(key, table)| {
                let snapshot = TableSnapshot {
                    schema: table.schema().clone(),
                    rows: table.rows().cloned().collect(),
                    next_row_id: table.next_row_id(),
                };
                (key.clone(), snapshot)
            })
            .collect();

        Snapshot {
            version: SNAPSHOT_VERSION.to_string(),
            tables,
            created_at: self.created_at,
            updated_at: now_millis(),
        }
    }

    /// Replace every table with the snapshot's contents.
    ///
    /// All tables are rebuilt before the swap, so a rejected snapshot
    /// leaves the current state untouched.
    pub fn restore(&mut self, snapshot: Snapshot) -> Result<()> {
        if snapshot.version != SNAPSHOT_VERSION {
            warn!(
                "[restore] snapshot version {} differs from {}, loading anyway",
                snapshot.version, SNAPSHOT_VERSION
            );
        }

        let mut tables = BTreeMap::new();
        for (name, table) in snapshot.tables {
            let mut schema = table.schema;
            schema.validate().map_err(|e| {
                QuillError::Persistence(format!("Invalid snapshot: table '{}': {}", name, e))
            })?;
            schema.derive_primary_key();
            let key = schema.name.to_lowercase();
            if tables.contains_key(&key) {
                return Err(QuillError::Persistence(format!(
                    "Invalid snapshot: table '{}' appears more than once",
                    schema.name
                )));
            }

            let rebuilt = Table::from_rows(schema, table.rows, table.next_row_id).map_err(|e| {
                QuillError::Persistence(format!("Invalid snapshot: table '{}': {}", name, e))
            })?;
            tables.insert(key, rebuilt);
        }

        self.tables = tables;
        self.created_at = snapshot.created_at;
        Ok(())
    }

    /// Write a snapshot to `path` (temp file + rename)
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = checked_path(path.as_ref())?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                QuillError::Persistence(format!("Cannot create directory {}: {}", parent.display(), e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.snapshot())?;
        let temp_path = temp_path_for(path);
        fs::write(&temp_path, json).map_err(|e| {
            QuillError::Persistence(format!("Cannot write {}: {}", temp_path.display(), e))
        })?;
        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(QuillError::Persistence(format!(
                "Cannot replace {}: {}",
                path.display(),
                e
            )));
        }

        info!("[save] {} tables -> {}", self.tables.len(), path.display());
        Ok(())
    }

    /// Replace the in-memory tables with the snapshot stored at `path`
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = checked_path(path.as_ref())?;

        if !path.exists() {
            return Err(QuillError::Persistence(format!(
                "Snapshot file not found: {}",
                path.display()
            )));
        }

        let json = fs::read_to_string(path).map_err(|e| {
            QuillError::Persistence(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let snapshot: Snapshot = serde_json::from_str(&json).map_err(|e| {
            QuillError::Persistence(format!("Invalid snapshot {}: {}", path.display(), e))
        })?;

        self.restore(snapshot)?;
        info!("[load] {} tables <- {}", self.tables.len(), path.display());
        Ok(())
    }

    /// Open a database from `path`, starting empty when the file is absent
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut db = Database::new();
        if path.as_ref().exists() {
            db.load(path)?;
        }
        Ok(db)
    }
}

fn checked_path(path: &Path) -> Result<&Path> {
    if path.as_os_str().is_empty() {
        Err(QuillError::Persistence("No snapshot path specified".to_string()))
    } else {
        Ok(path)
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

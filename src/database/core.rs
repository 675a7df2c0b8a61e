//! Database Core - table registry
//!
//! The `Database` owns every `Table`, keyed by lowercase table name so that
//! lookups are case-insensitive while the schema keeps the declared name.

use super::table::Table;
use crate::types::TableSchema;
use crate::{QuillError, Result};
use log::info;
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Database statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseStats {
    pub tables: usize,
    pub total_rows: usize,
    pub indexes: usize,
}

pub struct Database {
    /// Lowercase table name -> table
    pub(crate) tables: BTreeMap<String, Table>,
    /// Unix milliseconds, carried through snapshots
    pub(crate) created_at: u64,
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl Database {
    pub fn new() -> Self {
        Self {
            tables: BTreeMap::new(),
            created_at: now_millis(),
        }
    }

    /// Create a new table.
    ///
    /// Fails when the name is taken (case-insensitive), when no columns are
    /// given, when two columns share a name, or when more than one column is
    /// declared PRIMARY KEY. Derives the schema's primary key column.
    ///
    /// # Example
    /// ```ignore
    /// use quilldb::types::{TableSchema, ColumnDef, ColumnType};
    ///
    /// let schema = TableSchema::new("users", vec![
    ///     ColumnDef::new("id", ColumnType::Int).primary_key(),
    ///     ColumnDef::new("name", ColumnType::Text),
    /// ]);
    /// db.create_table(schema)?;
    /// ```
    pub fn create_table(&mut self, mut schema: TableSchema) -> Result<()> {
        let key = schema.name.to_lowercase();
        if self.tables.contains_key(&key) {
            return Err(QuillError::Schema(format!(
                "Table '{}' already exists",
                schema.name
            )));
        }

        schema.validate()?;
        schema.derive_primary_key();
        info!(
            "[create_table] {} ({} columns, primary key: {})",
            schema.name,
            schema.column_count(),
            schema.primary_key().unwrap_or("none")
        );
        self.tables.insert(key, Table::new(schema));
        Ok(())
    }

    pub fn get_table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(&name.to_lowercase())
            .ok_or_else(|| QuillError::TableNotFound(name.to_string()))
    }

    pub fn get_table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(&name.to_lowercase())
            .ok_or_else(|| QuillError::TableNotFound(name.to_string()))
    }

    pub fn get_table_schema(&self, name: &str) -> Result<&TableSchema> {
        self.get_table(name).map(Table::schema)
    }

    /// Drop a table together with its rows and indexes
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        match self.tables.remove(&name.to_lowercase()) {
            Some(table) => {
                info!("[drop_table] {} ({} rows)", table.name(), table.row_count());
                Ok(())
            }
            None => Err(QuillError::TableNotFound(name.to_string())),
        }
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(&name.to_lowercase())
    }

    /// Declared table names, ordered by lowercase name
    pub fn list_tables(&self) -> Vec<String> {
        self.tables.values().map(|t| t.name().to_string()).collect()
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Remove every table
    pub fn clear(&mut self) {
        self.tables.clear();
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn stats(&self) -> DatabaseStats {
        DatabaseStats {
            tables: self.tables.len(),
            total_rows: self.tables.values().map(Table::row_count).sum(),
            indexes: self.tables.values().map(|t| t.indexed_columns().len()).sum(),
        }
    }
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

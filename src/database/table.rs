//! Table storage
//!
//! A `Table` owns its schema, its rows keyed by row identifier, the
//! identifier counter and one `HashIndex` per PRIMARY KEY / UNIQUE column.
//! Indexes hold row identifiers only, so they can always be rebuilt from
//! the rows.

use crate::index::HashIndex;
use crate::types::{ColumnDef, RowId, SqlRow, StoredRow, TableSchema, Value};
use crate::{QuillError, Result};
use ahash::AHashMap;
use std::collections::BTreeMap;

pub struct Table {
    schema: TableSchema,
    /// Row id -> row, iterated in insertion order
    rows: BTreeMap<RowId, StoredRow>,
    next_row_id: RowId,
    /// Canonical column name -> index
    indexes: AHashMap<String, HashIndex>,
}

impl Table {
    /// Create an empty table; an index is set up for every constrained column
    pub fn new(schema: TableSchema) -> Self {
        let indexes = schema
            .columns
            .iter()
            .filter(|c| c.is_indexed())
            .map(|c| (c.name.clone(), HashIndex::new(c.name.clone())))
            .collect();

        Self {
            schema,
            rows: BTreeMap::new(),
            next_row_id: 1,
            indexes,
        }
    }

    /// Rebuild a table from stored rows (snapshot load).
    ///
    /// Rows are normalized to the schema's columns and checked against the
    /// declared types and constraints; indexes are rebuilt from scratch.
    pub fn from_rows(schema: TableSchema, rows: Vec<StoredRow>, next_row_id: RowId) -> Result<Self> {
        let mut table = Table::new(schema);

        for stored in rows {
            if stored.row_id == 0 || stored.row_id >= next_row_id {
                return Err(QuillError::InvalidArgument(format!(
                    "Row id {} in table '{}' is outside the allocated range (next row id {})",
                    stored.row_id,
                    table.name(),
                    next_row_id
                )));
            }
            if table.rows.contains_key(&stored.row_id) {
                return Err(QuillError::InvalidArgument(format!(
                    "Duplicate row id {} in table '{}'",
                    stored.row_id,
                    table.name()
                )));
            }

            let mut data = SqlRow::with_capacity(table.schema.column_count());
            for (name, value) in stored.data {
                let col = table.resolve_column(&name)?;
                table.check_type(col, &value)?;
                if data.insert(col.name.clone(), value).is_some() {
                    return Err(QuillError::InvalidArgument(format!(
                        "Row {} in table '{}' sets column '{}' more than once",
                        stored.row_id,
                        table.name(),
                        col.name
                    )));
                }
            }
            for col in &table.schema.columns {
                data.entry(col.name.clone()).or_insert(Value::Null);
            }

            table.check_constraints(&data, None)?;
            let row = StoredRow::new(stored.row_id, data);
            table.index_row(&row);
            table.rows.insert(row.row_id, row);
        }

        table.next_row_id = next_row_id;
        Ok(table)
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Identifier the next insert will receive
    pub fn next_row_id(&self) -> RowId {
        self.next_row_id
    }

    /// Rows in ascending row-id order
    pub fn rows(&self) -> impl Iterator<Item = &StoredRow> {
        self.rows.values()
    }

    pub fn get_row(&self, row_id: RowId) -> Option<&StoredRow> {
        self.rows.get(&row_id)
    }

    /// Index on `column` (case-insensitive), if the column is constrained
    pub fn index(&self, column: &str) -> Option<&HashIndex> {
        let col = self.schema.get_column(column)?;
        self.indexes.get(&col.name)
    }

    pub fn has_index(&self, column: &str) -> bool {
        self.index(column).is_some()
    }

    /// Names of indexed columns, in schema order
    pub fn indexed_columns(&self) -> Vec<&str> {
        self.schema
            .columns
            .iter()
            .filter(|c| self.indexes.contains_key(&c.name))
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Resolve a column reference, stripping any `table.` qualifier
    pub fn resolve_column(&self, name: &str) -> Result<&ColumnDef> {
        let bare = strip_qualifier(name);
        self.schema.get_column(bare).ok_or_else(|| {
            QuillError::ColumnNotFound(format!("{}.{}", self.schema.name, bare))
        })
    }

    pub(crate) fn check_type(&self, col: &ColumnDef, value: &Value) -> Result<()> {
        if value.fits(col.col_type) {
            Ok(())
        } else {
            Err(QuillError::TypeMismatch(format!(
                "Column '{}' expects {}, got {} value {}",
                col.name,
                col.col_type,
                value.kind(),
                value
            )))
        }
    }

    /// Validate PRIMARY KEY / UNIQUE constraints for a prospective row.
    ///
    /// `own_row` is the identifier the row currently holds (updates), which
    /// is excluded from the collision check.
    pub(crate) fn check_constraints(&self, candidate: &SqlRow, own_row: Option<RowId>) -> Result<()> {
        for col in self.schema.columns.iter().filter(|c| c.is_indexed()) {
            let value = candidate.get(&col.name).unwrap_or(&Value::Null);

            if value.is_null() {
                if col.is_primary_key() {
                    return Err(QuillError::ConstraintViolation(format!(
                        "Primary key column '{}' cannot be NULL",
                        col.name
                    )));
                }
                continue;
            }

            if let Some(index) = self.indexes.get(&col.name) {
                if index.held_by_other(value, own_row) {
                    let kind = if col.is_primary_key() { "Primary key" } else { "Unique" };
                    return Err(QuillError::ConstraintViolation(format!(
                        "{} constraint violated: {}.{} = {} already exists",
                        kind, self.schema.name, col.name, value
                    )));
                }
            }
        }
        Ok(())
    }

    /// Add every non-null indexed value of `row`
    pub(crate) fn index_row(&mut self, row: &StoredRow) {
        for (column, index) in self.indexes.iter_mut() {
            let value = row.get(column);
            if !value.is_null() {
                index.add(value, row.row_id);
            }
        }
    }

    /// Remove every non-null indexed value of `row`
    pub(crate) fn unindex_row(&mut self, row: &StoredRow) {
        for (column, index) in self.indexes.iter_mut() {
            let value = row.get(column);
            if !value.is_null() {
                index.remove(value, row.row_id);
            }
        }
    }

    pub(crate) fn allocate_row_id(&mut self) -> RowId {
        let id = self.next_row_id;
        self.next_row_id += 1;
        id
    }

    pub(crate) fn rows_mut(&mut self) -> &mut BTreeMap<RowId, StoredRow> {
        &mut self.rows
    }
}

/// `users.id` -> `id`; bare names pass through
pub(crate) fn strip_qualifier(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((_, column)) => column,
        None => name,
    }
}

//! Value and row types shared by the SQL layer and the storage engine

mod table;

pub use table::{ColumnConstraint, ColumnDef, ColumnType, TableSchema};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A single cell value.
///
/// Serialized untagged so snapshots hold plain JSON numbers, strings,
/// booleans and `null`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Text(String),
    Bool(bool),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Runtime kind name, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Text(_) => "text",
            Value::Bool(_) => "boolean",
            Value::Null => "null",
        }
    }

    /// Column type this value can be stored in; `None` for NULL,
    /// which every column accepts
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            Value::Integer(_) => Some(ColumnType::Int),
            Value::Text(_) => Some(ColumnType::Text),
            Value::Bool(_) => Some(ColumnType::Bool),
            Value::Null => None,
        }
    }

    pub fn fits(&self, col_type: ColumnType) -> bool {
        self.column_type().map_or(true, |t| t == col_type)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Null => write!(f, "NULL"),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// A row as a column name -> value mapping; always holds every schema column
pub type SqlRow = HashMap<String, Value>;

/// Row identifier, unique for the lifetime of its table
pub type RowId = u64;

/// A row together with its identifier, as kept in table storage and snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRow {
    pub row_id: RowId,
    pub data: SqlRow,
}

impl StoredRow {
    pub fn new(row_id: RowId, data: SqlRow) -> Self {
        Self { row_id, data }
    }

    pub fn get(&self, column: &str) -> &Value {
        self.data.get(column).unwrap_or(&Value::Null)
    }
}

/// Projected rows in output column order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Table metadata and schema definitions
use crate::{QuillError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Declared column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Int,
    Text,
    Bool,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Int => write!(f, "INT"),
            ColumnType::Text => write!(f, "TEXT"),
            ColumnType::Bool => write!(f, "BOOL"),
        }
    }
}

/// Column constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnConstraint {
    PrimaryKey,
    Unique,
}

impl fmt::Display for ColumnConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnConstraint::PrimaryKey => write!(f, "PRIMARY_KEY"),
            ColumnConstraint::Unique => write!(f, "UNIQUE"),
        }
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name, stored as declared
    pub name: String,
    #[serde(rename = "type")]
    pub col_type: ColumnType,
    #[serde(default)]
    pub constraints: Vec<ColumnConstraint>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, col_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            col_type,
            constraints: Vec::new(),
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.add_constraint(ColumnConstraint::PrimaryKey);
        self
    }

    pub fn unique(mut self) -> Self {
        self.add_constraint(ColumnConstraint::Unique);
        self
    }

    /// Add a constraint; repeating one is a no-op
    pub fn add_constraint(&mut self, constraint: ColumnConstraint) {
        if !self.constraints.contains(&constraint) {
            self.constraints.push(constraint);
        }
    }

    pub fn is_primary_key(&self) -> bool {
        self.constraints.contains(&ColumnConstraint::PrimaryKey)
    }

    pub fn is_unique(&self) -> bool {
        self.constraints.contains(&ColumnConstraint::Unique)
    }

    /// Columns carrying PRIMARY_KEY or UNIQUE get a hash index
    pub fn is_indexed(&self) -> bool {
        self.is_primary_key() || self.is_unique()
    }

    /// Comma-joined constraint list, or `NONE`
    pub fn constraint_summary(&self) -> String {
        if self.constraints.is_empty() {
            "NONE".to_string()
        } else {
            self.constraints
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        }
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Table schema definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    /// Table name, stored as declared
    pub name: String,
    /// Column definitions (ordered)
    pub columns: Vec<ColumnDef>,
    /// Primary key column name, derived on table creation
    #[serde(default)]
    pub primary_key: Option<String>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self {
            name: name.into(),
            columns,
            primary_key: None,
        }
    }

    /// Check the structural rules every table obeys: at least one column,
    /// no two columns sharing a name (case-insensitive), and at most one
    /// PRIMARY KEY
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(QuillError::Schema(format!(
                "Table '{}' must have at least one column",
                self.name
            )));
        }

        let mut seen = HashSet::with_capacity(self.columns.len());
        for col in &self.columns {
            if !seen.insert(col.name.to_lowercase()) {
                return Err(QuillError::Schema(format!(
                    "Duplicate column name '{}' in table '{}'",
                    col.name, self.name
                )));
            }
        }

        let pk_count = self.columns.iter().filter(|c| c.is_primary_key()).count();
        if pk_count > 1 {
            return Err(QuillError::Schema(format!(
                "Table '{}' declares {} primary keys; composite primary keys are not supported",
                self.name, pk_count
            )));
        }
        Ok(())
    }

    /// Recompute `primary_key` from the column constraints
    pub fn derive_primary_key(&mut self) {
        self.primary_key = self
            .columns
            .iter()
            .find(|c| c.is_primary_key())
            .map(|c| c.name.clone());
    }

    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    /// Case-insensitive column lookup
    pub fn get_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.matches_name(name))
    }

    pub fn get_column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.matches_name(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_key
            .as_deref()
            .is_some_and(|pk| pk.eq_ignore_ascii_case(column))
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users_schema() -> TableSchema {
        TableSchema::new(
            "Users",
            vec![
                ColumnDef::new("id", ColumnType::Int).primary_key(),
                ColumnDef::new("Email", ColumnType::Text).unique(),
                ColumnDef::new("active", ColumnType::Bool),
            ],
        )
    }

    #[test]
    fn test_column_lookup_ignores_case() {
        let schema = users_schema();
        assert_eq!(schema.get_column("email").unwrap().name, "Email");
        assert_eq!(schema.get_column_position("ACTIVE"), Some(2));
        assert!(schema.get_column("missing").is_none());
        assert!(schema.matches_name("users"));
    }

    #[test]
    fn test_validate_rejects_malformed_schemas() {
        assert!(users_schema().validate().is_ok());

        let empty = TableSchema::new("e", vec![]);
        assert!(matches!(empty.validate(), Err(QuillError::Schema(_))));

        let dup = TableSchema::new(
            "t",
            vec![ColumnDef::new("a", ColumnType::Int), ColumnDef::new("A", ColumnType::Text)],
        );
        assert!(matches!(dup.validate(), Err(QuillError::Schema(_))));

        let two_pks = TableSchema::new(
            "t",
            vec![
                ColumnDef::new("a", ColumnType::Int).primary_key(),
                ColumnDef::new("b", ColumnType::Int).primary_key(),
            ],
        );
        assert!(matches!(two_pks.validate(), Err(QuillError::Schema(_))));
    }

    #[test]
    fn test_derive_primary_key() {
        let mut schema = users_schema();
        assert_eq!(schema.primary_key(), None);
        schema.derive_primary_key();
        assert_eq!(schema.primary_key(), Some("id"));
        assert!(schema.is_primary_key("ID"));
        assert!(!schema.is_primary_key("Email"));
    }

    #[test]
    fn test_constraint_summary() {
        let schema = users_schema();
        assert_eq!(schema.columns[0].constraint_summary(), "PRIMARY_KEY");
        assert_eq!(schema.columns[2].constraint_summary(), "NONE");

        let both = ColumnDef::new("code", ColumnType::Text).primary_key().unique().unique();
        assert_eq!(both.constraint_summary(), "PRIMARY_KEY, UNIQUE");
        assert!(both.is_indexed());
        assert!(!schema.columns[2].is_indexed());
    }

    #[test]
    fn test_schema_serde_shape() {
        let mut schema = users_schema();
        schema.derive_primary_key();
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["primaryKey"], "id");
        assert_eq!(json["columns"][0]["type"], "INT");
        assert_eq!(json["columns"][0]["constraints"][0], "PRIMARY_KEY");

        let back: TableSchema = serde_json::from_value(json).unwrap();
        assert_eq!(back, schema);
    }
}

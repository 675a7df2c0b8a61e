/// Abstract Syntax Tree for SQL statements
use crate::types::{ColumnDef, Value};
use std::fmt;

/// Top-level SQL statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable(CreateTableStmt),
    Insert(InsertStmt),
    Select(SelectStmt),
    Update(UpdateStmt),
    Delete(DeleteStmt),
    ShowTables,
    DescribeTable(String), // table name
}

impl Statement {
    /// True for statements that change table contents or the table set
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Statement::CreateTable(_) | Statement::Insert(_) | Statement::Update(_) | Statement::Delete(_)
        )
    }
}

/// Column reference, optionally table-qualified: `col` or `table.col`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub column: String,
}

impl ColumnRef {
    pub fn new(column: impl Into<String>) -> Self {
        Self { table: None, column: column.into() }
    }

    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            column: column.into(),
        }
    }

    /// Qualifier matches `table` (case-insensitive)
    pub fn refers_to(&self, table: &str) -> bool {
        self.table
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(table))
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{}.{}", table, self.column),
            None => write!(f, "{}", self.column),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectColumns {
    Star,                   // *
    Columns(Vec<ColumnRef>), // col_list
}

/// CREATE TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStmt {
    pub table: String,
    pub columns: Vec<ColumnDef>,
}

/// INSERT statement
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStmt {
    pub table: String,
    pub columns: Vec<String>,
    pub values: Vec<Value>,
}

/// SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStmt {
    pub columns: SelectColumns,
    pub from: String,
    pub join: Option<JoinClause>,
    pub where_clause: Option<WhereCondition>,
}

/// `INNER JOIN table ON left = right`
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub table: String,
    pub left: ColumnRef,
    pub right: ColumnRef,
}

/// `WHERE column = value`; equality is the only comparison
#[derive(Debug, Clone, PartialEq)]
pub struct WhereCondition {
    pub column: ColumnRef,
    pub value: Value,
}

/// UPDATE statement
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStmt {
    pub table: String,
    pub assignments: Vec<(String, Value)>, // column = value
    pub where_clause: Option<WhereCondition>,
}

/// DELETE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStmt {
    pub table: String,
    pub where_clause: Option<WhereCondition>,
}

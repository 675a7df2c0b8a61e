/// Query executor - executes SQL statements against storage engine
use super::ast::*;
use super::join::inner_join;
use crate::database::{Database, Table};
use crate::error::{QuillError, Result};
use crate::types::{RowSet, SqlRow, TableSchema, Value};
use log::debug;
use std::collections::HashMap;

/// Query result
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// SELECT / SHOW TABLES / DESCRIBE result
    Select {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },

    /// INSERT/UPDATE/DELETE result
    Modification {
        message: String,
        affected_rows: usize,
    },

    /// CREATE result
    Definition {
        message: String,
    },
}

/// Outcome of one statement; the error's `Display` is the failure description
pub type ExecutionResult = Result<QueryResult>;

impl QueryResult {
    pub fn affected_rows(&self) -> usize {
        match self {
            QueryResult::Modification { affected_rows, .. } => *affected_rows,
            _ => 0,
        }
    }

    /// Get columns and rows from SELECT result
    /// Returns None if not a SELECT result
    pub fn select_rows(&self) -> Option<(&[String], &[Vec<Value>])> {
        match self {
            QueryResult::Select { columns, rows } => Some((columns.as_slice(), rows.as_slice())),
            _ => None,
        }
    }

    pub fn columns(&self) -> Option<&[String]> {
        self.select_rows().map(|(columns, _)| columns)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            QueryResult::Modification { message, .. } | QueryResult::Definition { message } => Some(message),
            QueryResult::Select { .. } => None,
        }
    }

    /// Get rows as maps (column_name -> value)
    /// Returns empty vec if not a SELECT result
    pub fn rows_as_maps(&self) -> Vec<HashMap<String, Value>> {
        match self {
            QueryResult::Select { columns, rows } => rows
                .iter()
                .map(|row| {
                    columns
                        .iter()
                        .zip(row.iter())
                        .map(|(col, val)| (col.clone(), val.clone()))
                        .collect()
                })
                .collect(),
            _ => vec![],
        }
    }

    /// Get row count for SELECT results
    pub fn row_count(&self) -> usize {
        match self {
            QueryResult::Select { rows, .. } => rows.len(),
            QueryResult::Modification { affected_rows, .. } => *affected_rows,
            QueryResult::Definition { .. } => 0,
        }
    }
}

impl From<RowSet> for QueryResult {
    fn from(set: RowSet) -> Self {
        QueryResult::Select {
            columns: set.columns,
            rows: set.rows,
        }
    }
}

/// How a single-table WHERE is answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessPath {
    /// Equality lookup in the column's hash index
    IndexLookup(String),
    /// Scan every row with an in-memory predicate
    FullScan(String),
}

/// `column = value` bound to a canonical column name
#[derive(Debug, Clone)]
struct EqualityFilter {
    column: String,
    value: Value,
}

impl EqualityFilter {
    fn matches(&self, row: &SqlRow) -> bool {
        row.get(&self.column).unwrap_or(&Value::Null) == &self.value
    }
}

/// Executes parsed statements against one database
pub struct QueryExecutor<'db> {
    db: &'db mut Database,
}

impl<'db> QueryExecutor<'db> {
    pub fn new(db: &'db mut Database) -> Self {
        Self { db }
    }

    /// Execute a statement
    pub fn execute(&mut self, stmt: Statement) -> ExecutionResult {
        match stmt {
            Statement::CreateTable(c) => self.execute_create_table(c),
            Statement::Insert(i) => self.execute_insert(i),
            Statement::Select(s) => self.execute_select(s),
            Statement::Update(u) => self.execute_update(u),
            Statement::Delete(d) => self.execute_delete(d),
            Statement::ShowTables => self.execute_show_tables(),
            Statement::DescribeTable(table_name) => self.execute_describe_table(&table_name),
        }
    }

    fn execute_create_table(&mut self, stmt: CreateTableStmt) -> ExecutionResult {
        let name = stmt.table.clone();
        self.db.create_table(TableSchema::new(stmt.table, stmt.columns))?;

        Ok(QueryResult::Definition {
            message: format!("Table '{}' created", name),
        })
    }

    fn execute_insert(&mut self, stmt: InsertStmt) -> ExecutionResult {
        let table = self.db.get_table_mut(&stmt.table)?;
        table.insert(&stmt.columns, stmt.values)?;

        Ok(QueryResult::Modification {
            message: format!("Inserted 1 row into {}", table.name()),
            affected_rows: 1,
        })
    }

    fn execute_select(&mut self, stmt: SelectStmt) -> ExecutionResult {
        let table = self.db.get_table(&stmt.from)?;

        if let Some(join) = &stmt.join {
            let right = self.db.get_table(&join.table)?;
            return inner_join(table, right, join, &stmt.columns, stmt.where_clause.as_ref()).map(QueryResult::from);
        }

        let columns = match &stmt.columns {
            SelectColumns::Star => None,
            SelectColumns::Columns(refs) => Some(
                refs.iter()
                    .map(|r| check_qualifier(table, r).map(|_| r.column.clone()))
                    .collect::<Result<Vec<_>>>()?,
            ),
        };

        let rows = match &stmt.where_clause {
            None => table.select(columns.as_deref(), None)?,
            Some(cond) => {
                let filter = bind_filter(table, cond)?;
                match plan_access(table, &filter) {
                    AccessPath::IndexLookup(column) => {
                        debug!("[select] index lookup on {}.{}", table.name(), column);
                        let ids = table
                            .index(&column)
                            .map(|index| index.lookup(&filter.value))
                            .unwrap_or_default();
                        table.select_ids(columns.as_deref(), ids)?
                    }
                    AccessPath::FullScan(column) => {
                        debug!("[select] full scan of {} filtering on {}", table.name(), column);
                        let predicate = |row: &SqlRow| filter.matches(row);
                        table.select(columns.as_deref(), Some(&predicate))?
                    }
                }
            }
        };

        Ok(rows.into())
    }

    fn execute_update(&mut self, stmt: UpdateStmt) -> ExecutionResult {
        let filter = self.filter_for(&stmt.table, stmt.where_clause.as_ref())?;
        let table = self.db.get_table_mut(&stmt.table)?;

        let predicate = |row: &SqlRow| filter.as_ref().map_or(true, |f| f.matches(row));
        let affected = table.update(&stmt.assignments, Some(&predicate))?;

        Ok(QueryResult::Modification {
            message: format!("Updated {} in {}", plural_rows(affected), table.name()),
            affected_rows: affected,
        })
    }

    fn execute_delete(&mut self, stmt: DeleteStmt) -> ExecutionResult {
        let filter = self.filter_for(&stmt.table, stmt.where_clause.as_ref())?;
        let table = self.db.get_table_mut(&stmt.table)?;

        let predicate = |row: &SqlRow| filter.as_ref().map_or(true, |f| f.matches(row));
        let affected = table.delete(Some(&predicate))?;

        Ok(QueryResult::Modification {
            message: format!("Deleted {} from {}", plural_rows(affected), table.name()),
            affected_rows: affected,
        })
    }

    fn execute_show_tables(&self) -> ExecutionResult {
        let rows = self
            .db
            .list_tables()
            .into_iter()
            .map(|name| vec![Value::Text(name)])
            .collect();

        Ok(QueryResult::Select {
            columns: vec!["Tables".to_string()],
            rows,
        })
    }

    /// Execute DESCRIBE TABLE
    fn execute_describe_table(&self, table_name: &str) -> ExecutionResult {
        let schema = self.db.get_table_schema(table_name)?;

        let columns = vec![
            "Column".to_string(),
            "Type".to_string(),
            "Constraints".to_string(),
        ];

        let rows = schema
            .columns
            .iter()
            .map(|col| {
                vec![
                    Value::Text(col.name.clone()),
                    Value::Text(col.col_type.to_string()),
                    Value::Text(col.constraint_summary()),
                ]
            })
            .collect();

        Ok(QueryResult::Select { columns, rows })
    }

    fn filter_for(&self, table: &str, cond: Option<&WhereCondition>) -> Result<Option<EqualityFilter>> {
        let table = self.db.get_table(table)?;
        cond.map(|c| bind_filter(table, c)).transpose()
    }
}

/// Index lookup when the column is indexed (PRIMARY KEY or UNIQUE) and the
/// value is non-null; NULL is never indexed, so it always scans
fn plan_access(table: &Table, filter: &EqualityFilter) -> AccessPath {
    if table.has_index(&filter.column) && !filter.value.is_null() {
        AccessPath::IndexLookup(filter.column.clone())
    } else {
        AccessPath::FullScan(filter.column.clone())
    }
}

fn bind_filter(table: &Table, cond: &WhereCondition) -> Result<EqualityFilter> {
    check_qualifier(table, &cond.column)?;
    let col = table.resolve_column(&cond.column.column)?;
    Ok(EqualityFilter {
        column: col.name.clone(),
        value: cond.value.clone(),
    })
}

/// A qualified reference must name the statement's table
fn check_qualifier(table: &Table, column: &ColumnRef) -> Result<()> {
    match &column.table {
        Some(qualifier) if !qualifier.eq_ignore_ascii_case(table.name()) => {
            Err(QuillError::ColumnNotFound(column.to_string()))
        }
        _ => Ok(()),
    }
}

fn plural_rows(n: usize) -> String {
    if n == 1 {
        "1 row".to_string()
    } else {
        format!("{} rows", n)
    }
}

impl Database {
    /// Access path a single-table `WHERE column = value` would take
    pub fn explain_where(&self, table: &str, cond: &WhereCondition) -> Result<AccessPath> {
        let table = self.get_table(table)?;
        let filter = bind_filter(table, cond)?;
        Ok(plan_access(table, &filter))
    }
}

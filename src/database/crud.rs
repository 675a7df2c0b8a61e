//! CRUD Operations
//!
//! Insert, select, update and delete on a single table. Every mutation
//! validates first and applies second: a failing statement returns before
//! any row or index is touched.

use super::table::Table;
use crate::types::{RowId, RowSet, SqlRow, StoredRow, Value};
use crate::{QuillError, Result};
use log::debug;
use std::collections::HashSet;

/// Row filter evaluated against full (unprojected) rows
pub type RowPredicate<'a> = dyn Fn(&SqlRow) -> bool + 'a;

impl Table {
    /// Insert one row.
    ///
    /// Columns not named in `columns` are stored as NULL. Returns the
    /// identifier assigned to the new row.
    ///
    /// # Example
    /// ```ignore
    /// table.insert(&["id".into(), "name".into()], vec![1.into(), "Alice".into()])?;
    /// ```
    pub fn insert(&mut self, columns: &[String], values: Vec<Value>) -> Result<RowId> {
        if columns.len() != values.len() {
            return Err(QuillError::InvalidArgument(format!(
                "Column count mismatch: {} columns, {} values",
                columns.len(),
                values.len()
            )));
        }

        let mut data = SqlRow::with_capacity(self.schema().column_count());
        for (name, value) in columns.iter().zip(values) {
            let col = self.resolve_column(name)?;
            if data.contains_key(&col.name) {
                return Err(QuillError::InvalidArgument(format!(
                    "Column '{}' specified more than once",
                    col.name
                )));
            }
            self.check_type(col, &value)?;
            data.insert(col.name.clone(), value);
        }
        for col in &self.schema().columns {
            data.entry(col.name.clone()).or_insert(Value::Null);
        }

        self.check_constraints(&data, None)?;

        let row_id = self.allocate_row_id();
        let row = StoredRow::new(row_id, data);
        self.index_row(&row);
        self.rows_mut().insert(row_id, row);

        debug!("[insert] {} row_id={}", self.name(), row_id);
        Ok(row_id)
    }

    /// Scan all rows, keep those matching `predicate` and project `columns`
    /// (`None` = every column in declared order).
    pub fn select(&self, columns: Option<&[String]>, predicate: Option<&RowPredicate>) -> Result<RowSet> {
        let names = self.projection(columns)?;
        let mut result = RowSet::new(names);

        for row in self.rows() {
            if predicate.map_or(true, |p| p(&row.data)) {
                result.rows.push(project(row, &result.columns));
            }
        }

        Ok(result)
    }

    /// Project the rows with the given identifiers (index lookups).
    /// Unknown identifiers are skipped.
    pub fn select_ids<I>(&self, columns: Option<&[String]>, ids: I) -> Result<RowSet>
    where
        I: IntoIterator<Item = RowId>,
    {
        let names = self.projection(columns)?;
        let mut result = RowSet::new(names);

        for row_id in ids {
            if let Some(row) = self.get_row(row_id) {
                result.rows.push(project(row, &result.columns));
            }
        }

        Ok(result)
    }

    /// Apply `assignments` to every row matching `predicate`.
    ///
    /// All candidate rows are checked as if the assignment had already
    /// happened (excluding each row's own identifier from the uniqueness
    /// check) before any row changes. Two rows swapping unique values in
    /// one batch is therefore rejected.
    pub fn update(&mut self, assignments: &[(String, Value)], predicate: Option<&RowPredicate>) -> Result<usize> {
        let mut resolved: Vec<(String, Value)> = Vec::with_capacity(assignments.len());
        for (name, value) in assignments {
            let col = self.resolve_column(name)?;
            if resolved.iter().any(|(c, _)| *c == col.name) {
                return Err(QuillError::InvalidArgument(format!(
                    "Column '{}' assigned more than once",
                    col.name
                )));
            }
            self.check_type(col, value)?;
            resolved.push((col.name.clone(), value.clone()));
        }

        let candidates: Vec<RowId> = self
            .rows()
            .filter(|row| predicate.map_or(true, |p| p(&row.data)))
            .map(|row| row.row_id)
            .collect();

        // Validate every candidate before touching anything
        let mut planned: Vec<StoredRow> = Vec::with_capacity(candidates.len());
        let mut claimed: HashSet<(&str, &Value)> = HashSet::new();
        for row_id in candidates {
            let Some(current) = self.get_row(row_id) else { continue };
            let mut data = current.data.clone();
            for (column, value) in &resolved {
                data.insert(column.clone(), value.clone());
            }
            self.check_constraints(&data, Some(row_id))?;

            for (column, value) in &resolved {
                if value.is_null() || !self.has_index(column) {
                    continue;
                }
                if !claimed.insert((column.as_str(), value)) {
                    return Err(QuillError::ConstraintViolation(format!(
                        "Unique constraint violated: {}.{} = {} would be assigned to more than one row",
                        self.name(),
                        column,
                        value
                    )));
                }
            }

            planned.push(StoredRow::new(row_id, data));
        }

        let affected = planned.len();
        for row in planned {
            if let Some(old) = self.rows_mut().insert(row.row_id, row.clone()) {
                self.unindex_row(&old);
            }
            self.index_row(&row);
        }

        debug!("[update] {} affected={}", self.name(), affected);
        Ok(affected)
    }

    /// Delete every row matching `predicate`; returns the number removed
    pub fn delete(&mut self, predicate: Option<&RowPredicate>) -> Result<usize> {
        let doomed: Vec<RowId> = self
            .rows()
            .filter(|row| predicate.map_or(true, |p| p(&row.data)))
            .map(|row| row.row_id)
            .collect();

        for row_id in &doomed {
            if let Some(row) = self.rows_mut().remove(row_id) {
                self.unindex_row(&row);
            }
        }

        debug!("[delete] {} affected={}", self.name(), doomed.len());
        Ok(doomed.len())
    }

    /// Canonical output column names for a projection
    fn projection(&self, columns: Option<&[String]>) -> Result<Vec<String>> {
        match columns {
            None => Ok(self.schema().column_names()),
            Some(cols) => cols
                .iter()
                .map(|c| self.resolve_column(c).map(|def| def.name.clone()))
                .collect(),
        }
    }
}

fn project(row: &StoredRow, columns: &[String]) -> Vec<Value> {
    columns.iter().map(|c| row.get(c).clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColumnDef, ColumnType, TableSchema};

    fn people() -> Table {
        let mut schema = TableSchema::new(
            "people",
            vec![
                ColumnDef::new("id", ColumnType::Int).primary_key(),
                ColumnDef::new("email", ColumnType::Text).unique(),
                ColumnDef::new("age", ColumnType::Int),
            ],
        );
        schema.derive_primary_key();
        Table::new(schema)
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn add(table: &mut Table, id: i64, email: &str, age: i64) -> RowId {
        table
            .insert(&cols(&["id", "email", "age"]), vec![id.into(), email.into(), age.into()])
            .unwrap()
    }

    fn email_is<'a>(email: &'a str) -> impl Fn(&SqlRow) -> bool + 'a {
        move |row: &SqlRow| row.get("email") == Some(&Value::Text(email.to_string()))
    }

    #[test]
    fn test_insert_assigns_increasing_ids() {
        let mut table = people();
        assert_eq!(add(&mut table, 1, "a@x", 30), 1);
        assert_eq!(add(&mut table, 2, "b@x", 40), 2);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.next_row_id(), 3);
    }

    #[test]
    fn test_insert_fills_missing_columns_with_null() {
        let mut table = people();
        let id = table.insert(&cols(&["ID"]), vec![Value::Integer(7)]).unwrap();
        let row = table.get_row(id).unwrap();
        assert_eq!(row.get("email"), &Value::Null);
        assert_eq!(row.get("age"), &Value::Null);
        assert_eq!(row.data.len(), 3);
    }

    #[test]
    fn test_insert_validation_errors() {
        let mut table = people();
        assert!(matches!(
            table.insert(&cols(&["id", "age"]), vec![Value::Integer(1)]),
            Err(QuillError::InvalidArgument(_))
        ));
        assert!(matches!(
            table.insert(&cols(&["id", "height"]), vec![1.into(), 2.into()]),
            Err(QuillError::ColumnNotFound(_))
        ));
        assert!(matches!(
            table.insert(&cols(&["id", "age"]), vec![1.into(), "old".into()]),
            Err(QuillError::TypeMismatch(_))
        ));
        assert!(matches!(
            table.insert(&cols(&["id", "id"]), vec![1.into(), 2.into()]),
            Err(QuillError::InvalidArgument(_))
        ));
        assert!(matches!(
            table.insert(&cols(&["age"]), vec![Value::Integer(3)]),
            Err(QuillError::ConstraintViolation(_))
        ));
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.next_row_id(), 1);
    }

    #[test]
    fn test_insert_duplicate_key_leaves_table_unchanged() {
        let mut table = people();
        add(&mut table, 1, "a@x", 30);

        let err = table
            .insert(&cols(&["id", "email"]), vec![1.into(), "other@x".into()])
            .unwrap_err();
        assert!(matches!(err, QuillError::ConstraintViolation(_)));

        let err = table
            .insert(&cols(&["id", "email"]), vec![2.into(), "a@x".into()])
            .unwrap_err();
        assert!(matches!(err, QuillError::ConstraintViolation(_)));

        assert_eq!(table.row_count(), 1);
        assert_eq!(table.index("email").unwrap().size(), 1);
        assert!(table.index("email").unwrap().lookup(&"other@x".into()).is_empty());
    }

    #[test]
    fn test_unique_column_allows_multiple_nulls() {
        let mut table = people();
        table.insert(&cols(&["id"]), vec![Value::Integer(1)]).unwrap();
        table.insert(&cols(&["id"]), vec![Value::Integer(2)]).unwrap();
        assert_eq!(table.row_count(), 2);
        assert!(table.index("email").unwrap().is_empty());
    }

    #[test]
    fn test_select_projection_and_predicate() {
        let mut table = people();
        add(&mut table, 1, "a@x", 30);
        add(&mut table, 2, "b@x", 40);

        let all = table.select(None, None).unwrap();
        assert_eq!(all.columns, cols(&["id", "email", "age"]));
        assert_eq!(all.rows[1], vec![Value::Integer(2), "b@x".into(), Value::Integer(40)]);

        let filter = email_is("b@x");
        let picked = table
            .select(Some(&cols(&["people.AGE", "id"])), Some(&filter))
            .unwrap();
        assert_eq!(picked.columns, cols(&["age", "id"]));
        assert_eq!(picked.rows, vec![vec![Value::Integer(40), Value::Integer(2)]]);

        assert!(matches!(
            table.select(Some(&cols(&["nope"])), None),
            Err(QuillError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_select_ids_skips_unknown_rows() {
        let mut table = people();
        add(&mut table, 1, "a@x", 30);
        let result = table.select_ids(None, [1, 99]).unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_update_maintains_index() {
        let mut table = people();
        add(&mut table, 1, "a@x", 30);
        add(&mut table, 2, "b@x", 40);

        let filter = email_is("a@x");
        let n = table
            .update(&[("email".into(), "c@x".into())], Some(&filter))
            .unwrap();
        assert_eq!(n, 1);

        let index = table.index("email").unwrap();
        assert!(index.lookup(&"a@x".into()).is_empty());
        assert!(index.lookup(&"c@x".into()).contains(&1));
        assert_eq!(index.size(), 2);
    }

    #[test]
    fn test_update_to_own_value_is_allowed() {
        let mut table = people();
        add(&mut table, 1, "a@x", 30);
        let filter = email_is("a@x");
        let n = table
            .update(&[("id".into(), Value::Integer(1)), ("age".into(), Value::Integer(31))], Some(&filter))
            .unwrap();
        assert_eq!(n, 1);
        assert_eq!(table.get_row(1).unwrap().get("age"), &Value::Integer(31));
    }

    #[test]
    fn test_update_unique_collision_changes_nothing() {
        let mut table = people();
        add(&mut table, 1, "a@x", 30);
        add(&mut table, 2, "b@x", 40);

        let filter = email_is("b@x");
        let err = table
            .update(&[("email".into(), "a@x".into())], Some(&filter))
            .unwrap_err();
        assert!(matches!(err, QuillError::ConstraintViolation(_)));

        assert_eq!(table.get_row(1).unwrap().get("email"), &Value::from("a@x"));
        assert_eq!(table.get_row(2).unwrap().get("email"), &Value::from("b@x"));
        assert!(table.index("email").unwrap().lookup(&"b@x".into()).contains(&2));
        assert!(table.index("email").unwrap().lookup(&"a@x".into()).contains(&1));
    }

    #[test]
    fn test_update_same_unique_value_on_many_rows_is_rejected() {
        let mut table = people();
        add(&mut table, 1, "a@x", 30);
        add(&mut table, 2, "b@x", 40);

        let err = table.update(&[("email".into(), "z@x".into())], None).unwrap_err();
        assert!(matches!(err, QuillError::ConstraintViolation(_)));
        assert!(!table.index("email").unwrap().has(&"z@x".into()));
    }

    #[test]
    fn test_update_rejects_null_primary_key_and_bad_types() {
        let mut table = people();
        add(&mut table, 1, "a@x", 30);

        assert!(matches!(
            table.update(&[("id".into(), Value::Null)], None),
            Err(QuillError::ConstraintViolation(_))
        ));
        assert!(matches!(
            table.update(&[("age".into(), Value::Bool(true))], None),
            Err(QuillError::TypeMismatch(_))
        ));
        assert!(matches!(
            table.update(&[("ghost".into(), Value::Integer(1))], None),
            Err(QuillError::ColumnNotFound(_))
        ));
        assert_eq!(table.get_row(1).unwrap().get("id"), &Value::Integer(1));
    }

    #[test]
    fn test_update_null_unique_value_drops_index_entry() {
        let mut table = people();
        add(&mut table, 1, "a@x", 30);
        table.update(&[("email".into(), Value::Null)], None).unwrap();
        assert!(table.index("email").unwrap().is_empty());
    }

    #[test]
    fn test_delete_removes_rows_and_index_entries() {
        let mut table = people();
        add(&mut table, 1, "a@x", 30);
        add(&mut table, 2, "b@x", 40);

        let filter = email_is("a@x");
        assert_eq!(table.delete(Some(&filter)).unwrap(), 1);
        assert_eq!(table.row_count(), 1);
        assert!(table.index("id").unwrap().lookup(&Value::Integer(1)).is_empty());

        assert_eq!(table.delete(None).unwrap(), 1);
        assert_eq!(table.row_count(), 0);
        assert!(table.index("id").unwrap().is_empty());
        assert!(table.index("email").unwrap().is_empty());
    }

    #[test]
    fn test_row_ids_are_never_reused() {
        let mut table = people();
        add(&mut table, 1, "a@x", 30);
        table.delete(None).unwrap();
        assert_eq!(add(&mut table, 1, "a@x", 30), 2);
    }
}

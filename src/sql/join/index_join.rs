/// Index Nested Loop Join implementation
///
/// Algorithm:
/// FOR each row in left table:
///     key = row[left_column]
///     matches = right_table.index_lookup(key)   // O(1) with an index
///            OR scan right_table for key        // O(m) without
///     OUTPUT project(row, match) for each match passing the filter
///
/// Time complexity: O(n * k) indexed, O(n * m) unindexed

use crate::database::Table;
use crate::error::{QuillError, Result};
use crate::sql::ast::{ColumnRef, JoinClause, SelectColumns, WhereCondition};
use crate::types::{RowSet, StoredRow, Value};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// A column reference bound to one side of the join
#[derive(Debug, Clone)]
struct BoundColumn {
    side: Side,
    column: String,
}

/// Index nested loop join executor over two borrowed tables
pub struct IndexNestedLoopJoin<'a> {
    left: &'a Table,
    right: &'a Table,
}

impl<'a> IndexNestedLoopJoin<'a> {
    pub fn new(left: &'a Table, right: &'a Table) -> Self {
        Self { left, right }
    }

    /// Execute the join
    ///
    /// # Arguments
    /// * `join` - right table name and the equality condition
    /// * `projection` - output columns; `*` expands to `left.col...` then `right.col...`
    /// * `filter` - optional WHERE, applied to each matched pair before projection
    pub fn execute(
        &self,
        join: &JoinClause,
        projection: &SelectColumns,
        filter: Option<&WhereCondition>,
    ) -> Result<RowSet> {
        let (left_key, right_key) = self.resolve_condition(join)?;
        let (names, outputs) = self.resolve_projection(projection)?;
        let filter = match filter {
            Some(cond) => Some((self.resolve_reference(&cond.column)?, &cond.value)),
            None => None,
        };

        let index = self.right.index(&right_key);
        debug!(
            "[join] {}.{} = {}.{} via {}",
            self.left.name(),
            left_key,
            self.right.name(),
            right_key,
            if index.is_some() { "index lookup" } else { "nested loop scan" }
        );

        let mut result = RowSet::new(names);
        for left_row in self.left.rows() {
            let key = left_row.get(&left_key);
            if key.is_null() {
                continue;
            }

            let matches: Vec<&StoredRow> = match index {
                Some(index) => index
                    .lookup(key)
                    .into_iter()
                    .filter_map(|row_id| self.right.get_row(row_id))
                    .collect(),
                None => self
                    .right
                    .rows()
                    .filter(|row| row.get(&right_key) == key)
                    .collect(),
            };

            for right_row in matches {
                if let Some((column, value)) = &filter {
                    if Self::pick(column, left_row, right_row) != *value {
                        continue;
                    }
                }
                result.rows.push(
                    outputs
                        .iter()
                        .map(|col| Self::pick(col, left_row, right_row).clone())
                        .collect(),
                );
            }
        }

        Ok(result)
    }

    /// Decide which side each reference of `left = right` belongs to.
    ///
    /// A qualifier naming one of the tables wins; an unqualified name goes to
    /// the only table that has it; anything still open falls back to
    /// position (first reference left, second right).
    fn resolve_condition(&self, join: &JoinClause) -> Result<(String, String)> {
        let first = self.side_hint(&join.left)?;
        let second = self.side_hint(&join.right)?;

        let (left_ref, right_ref) = match (first, second) {
            (Some(a), Some(b)) if a == b => {
                return Err(QuillError::InvalidArgument(format!(
                    "Join condition {} = {} must reference both {} and {}",
                    join.left,
                    join.right,
                    self.left.name(),
                    self.right.name()
                )));
            }
            (Some(Side::Right), _) | (_, Some(Side::Left)) => (&join.right, &join.left),
            _ => (&join.left, &join.right),
        };

        let left_col = self.left.resolve_column(&left_ref.column)?.name.clone();
        let right_col = self.right.resolve_column(&right_ref.column)?.name.clone();
        Ok((left_col, right_col))
    }

    /// Side a join-condition reference names, if it can be told apart
    fn side_hint(&self, column: &ColumnRef) -> Result<Option<Side>> {
        if self.left.name().eq_ignore_ascii_case(self.right.name()) {
            return Ok(None);
        }
        if column.table.is_some() {
            return self.side_of_qualifier(column).map(Some);
        }

        let in_left = self.left.schema().has_column(&column.column);
        let in_right = self.right.schema().has_column(&column.column);
        Ok(match (in_left, in_right) {
            (true, false) => Some(Side::Left),
            (false, true) => Some(Side::Right),
            _ => None,
        })
    }

    fn side_of_qualifier(&self, column: &ColumnRef) -> Result<Side> {
        if column.refers_to(self.left.name()) {
            Ok(Side::Left)
        } else if column.refers_to(self.right.name()) {
            Ok(Side::Right)
        } else {
            Err(QuillError::ColumnNotFound(column.to_string()))
        }
    }

    /// Bind a projection or filter reference: qualifier first, then the
    /// left table, then the right table
    fn resolve_reference(&self, column: &ColumnRef) -> Result<BoundColumn> {
        let side = if column.table.is_some() {
            self.side_of_qualifier(column)?
        } else if self.left.schema().has_column(&column.column) {
            Side::Left
        } else if self.right.schema().has_column(&column.column) {
            Side::Right
        } else {
            return Err(QuillError::ColumnNotFound(column.to_string()));
        };

        let table = match side {
            Side::Left => self.left,
            Side::Right => self.right,
        };
        let def = table.resolve_column(&column.column)?;
        Ok(BoundColumn {
            side,
            column: def.name.clone(),
        })
    }

    fn resolve_projection(&self, projection: &SelectColumns) -> Result<(Vec<String>, Vec<BoundColumn>)> {
        match projection {
            SelectColumns::Star => {
                let mut names = Vec::new();
                let mut outputs = Vec::new();
                for (side, table) in [(Side::Left, self.left), (Side::Right, self.right)] {
                    for col in &table.schema().columns {
                        names.push(format!("{}.{}", table.name(), col.name));
                        outputs.push(BoundColumn {
                            side,
                            column: col.name.clone(),
                        });
                    }
                }
                Ok((names, outputs))
            }
            SelectColumns::Columns(refs) => {
                let outputs = refs
                    .iter()
                    .map(|r| self.resolve_reference(r))
                    .collect::<Result<Vec<_>>>()?;
                let names = refs.iter().map(ColumnRef::to_string).collect();
                Ok((names, outputs))
            }
        }
    }

    fn pick<'r>(column: &BoundColumn, left: &'r StoredRow, right: &'r StoredRow) -> &'r Value {
        match column.side {
            Side::Left => left.get(&column.column),
            Side::Right => right.get(&column.column),
        }
    }
}

/// Join `left` with `right` on `join`, projecting `projection`
pub fn inner_join(
    left: &Table,
    right: &Table,
    join: &JoinClause,
    projection: &SelectColumns,
    filter: Option<&WhereCondition>,
) -> Result<RowSet> {
    IndexNestedLoopJoin::new(left, right).execute(join, projection, filter)
}

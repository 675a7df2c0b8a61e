//! QuillDB
//!
//! A single-process, in-memory relational engine: statement text goes in,
//! rows come out.
//!
//! ## Architecture
//! - SQL layer: lexer -> recursive-descent parser -> executor
//! - Storage layer: tables with PRIMARY KEY / UNIQUE hash indexes
//! - Join: two-table INNER JOIN, index nested loop when the right side is indexed
//! - Persistence: whole-database JSON snapshots
//!
//! ```
//! use quilldb::{execute_sql, Database, Value};
//!
//! let mut db = Database::new();
//! execute_sql(&mut db, "CREATE TABLE t (id INT PRIMARY KEY, n TEXT UNIQUE)")?;
//! execute_sql(&mut db, "INSERT INTO t (id, n) VALUES (1, 'x')")?;
//!
//! let result = execute_sql(&mut db, "SELECT n FROM t WHERE id = 1")?;
//! assert_eq!(result.select_rows().unwrap().1, &[vec![Value::from("x")]]);
//! # Ok::<(), quilldb::QuillError>(())
//! ```

pub mod config;
pub mod database;
pub mod index;
pub mod session;
pub mod sql;
pub mod types;

mod error;

pub use config::DBConfig;
pub use database::{Database, DatabaseStats, Table};
pub use error::{QuillError, Result};
pub use session::Session;
pub use sql::{execute_sql, ExecutionResult, QueryResult};
pub use types::{ColumnConstraint, ColumnDef, ColumnType, RowId, TableSchema, Value};

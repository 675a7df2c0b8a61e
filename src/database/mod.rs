//! Database Module
//!
//! # Module Structure
//! - `core`: `Database` registry (create/drop/list tables)
//! - `table`: `Table` storage, constraint checks and index upkeep
//! - `crud`: insert, select, update and delete on a table
//! - `persistence`: JSON snapshot save and load

pub mod core;
pub mod crud;
pub mod persistence;
pub mod table;

pub use core::{Database, DatabaseStats};
pub use crud::RowPredicate;
pub use persistence::{Snapshot, TableSnapshot, SNAPSHOT_VERSION};
pub use table::Table;

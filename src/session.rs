//! QuillDB Public API
//!
//! A `Session` owns one `Database` together with the `DBConfig` that says
//! where its snapshot lives. Front ends (the CLI, embedders) hold a session
//! and pass statement text to [`Session::execute`].
//!
//! # Quick start
//!
//! ```no_run
//! use quilldb::{DBConfig, Session};
//!
//! let config = DBConfig::default().with_data_path("data.json").with_autosave(true);
//! let mut session = Session::open(config)?;
//!
//! session.execute("CREATE TABLE users (id INT PRIMARY KEY, name TEXT)")?;
//! session.execute("INSERT INTO users (id, name) VALUES (1, 'Alice')")?;
//! let result = session.execute("SELECT * FROM users WHERE id = 1")?;
//! assert_eq!(result.row_count(), 1);
//! # Ok::<(), quilldb::QuillError>(())
//! ```

use crate::database::Database;
use crate::sql::{parse_sql, ExecutionResult, QueryExecutor};
use crate::{DBConfig, QuillError, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

pub struct Session {
    db: Database,
    config: DBConfig,
}

impl Session {
    /// Open a session; loads the configured snapshot when it exists and
    /// `load_on_open` is set
    pub fn open(config: DBConfig) -> Result<Self> {
        let mut db = Database::new();
        if config.load_on_open {
            if let Some(path) = config.data_path.as_deref().filter(|p| p.exists()) {
                db.load(path)?;
            }
        }
        Ok(Self { db, config })
    }

    /// Session with no snapshot file
    pub fn in_memory() -> Self {
        Self {
            db: Database::new(),
            config: DBConfig::in_memory(),
        }
    }

    /// Parse and execute one statement.
    ///
    /// With `autosave` on, a successful mutation is followed by a snapshot
    /// save; a failed save is reported as this statement's error while the
    /// in-memory change stays applied.
    pub fn execute(&mut self, sql: &str) -> ExecutionResult {
        let statement = parse_sql(sql)?;
        let mutates = statement.is_mutation();

        let result = QueryExecutor::new(&mut self.db).execute(statement)?;

        if mutates && self.config.autosave {
            if let Some(path) = &self.config.data_path {
                debug!("[autosave] {}", path.display());
                self.db.save(path)?;
            }
        }

        Ok(result)
    }

    /// Save to the configured `data_path`
    pub fn save(&self) -> Result<()> {
        let path = self.configured_path()?;
        self.db.save(path)
    }

    /// Reload from the configured `data_path`
    pub fn load(&mut self) -> Result<()> {
        let path = self.configured_path()?.to_path_buf();
        self.db.load(path)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.db.save(path)
    }

    pub fn load_from<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.db.load(path)
    }

    /// Point the session at a different snapshot file
    pub fn set_data_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        info!("[session] data path set to {}", path.display());
        self.config.data_path = Some(path);
    }

    pub fn config(&self) -> &DBConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn database_mut(&mut self) -> &mut Database {
        &mut self.db
    }

    fn configured_path(&self) -> Result<&Path> {
        self.config
            .data_path
            .as_deref()
            .ok_or_else(|| QuillError::Persistence("No path configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;
    use tempfile::TempDir;

    #[test]
    fn test_autosave_writes_after_mutations() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        let config = DBConfig::default().with_data_path(&path).with_autosave(true);

        let mut session = Session::open(config.clone()).unwrap();
        session.execute("CREATE TABLE t (id INT PRIMARY KEY)").unwrap();
        assert!(path.exists());
        session.execute("INSERT INTO t (id) VALUES (1)").unwrap();

        let reopened = Session::open(config).unwrap();
        let table = reopened.database().get_table("t").unwrap();
        assert_eq!(table.row_count(), 1);
        assert!(table.index("id").unwrap().has(&Value::Integer(1)));
    }

    #[test]
    fn test_reads_and_failures_do_not_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        let config = DBConfig::default().with_data_path(&path).with_autosave(true);

        let mut session = Session::open(config).unwrap();
        session.execute("SHOW TABLES").unwrap();
        assert!(session.execute("INSERT INTO missing (a) VALUES (1)").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_without_autosave_nothing_is_written_until_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");

        let mut session = Session::open(DBConfig::default().with_data_path(&path)).unwrap();
        session.execute("CREATE TABLE t (id INT)").unwrap();
        assert!(!path.exists());

        session.save().unwrap();
        assert!(path.exists());

        session.execute("INSERT INTO t (id) VALUES (5)").unwrap();
        session.load().unwrap();
        assert_eq!(session.database().get_table("t").unwrap().row_count(), 0);
    }

    #[test]
    fn test_load_on_open_can_be_disabled() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");

        let mut session = Session::open(DBConfig::default().with_data_path(&path)).unwrap();
        session.execute("CREATE TABLE t (id INT)").unwrap();
        session.save().unwrap();

        let config = DBConfig::default().with_data_path(&path).with_load_on_open(false);
        let fresh = Session::open(config).unwrap();
        assert_eq!(fresh.database().table_count(), 0);
    }

    #[test]
    fn test_save_without_path_is_persistence_error() {
        let mut session = Session::in_memory();
        assert!(matches!(session.save(), Err(QuillError::Persistence(_))));
        assert!(matches!(session.load(), Err(QuillError::Persistence(_))));

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("explicit.json");
        session.execute("CREATE TABLE t (id INT)").unwrap();
        session.save_to(&path).unwrap();

        let mut other = Session::in_memory();
        other.load_from(&path).unwrap();
        assert!(other.database().has_table("T"));
    }
}

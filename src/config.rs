//! Database configuration
//!
//! Where the snapshot lives and when it is read and written.

use crate::{QuillError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DBConfig {
    /// Snapshot file used by `Session::save` / `Session::load`
    pub data_path: Option<PathBuf>,

    /// Save the snapshot after every successful CREATE/INSERT/UPDATE/DELETE
    pub autosave: bool,

    /// Load `data_path` on open when the file exists
    pub load_on_open: bool,
}

impl Default for DBConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            autosave: false,
            load_on_open: true,
        }
    }
}

impl DBConfig {
    /// In-memory only: no snapshot file
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Read a JSON config file; missing fields take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            QuillError::InvalidArgument(format!("Cannot read config {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&json).map_err(|e| {
            QuillError::InvalidArgument(format!("Invalid config {}: {}", path.display(), e))
        })
    }

    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = Some(path.into());
        self
    }

    pub fn with_autosave(mut self, autosave: bool) -> Self {
        self.autosave = autosave;
        self
    }

    pub fn with_load_on_open(mut self, load_on_open: bool) -> Self {
        self.load_on_open = load_on_open;
        self
    }
}

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StoreError};

/// SQLite store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Path to the SQLite database file. The file and its schema must
    /// already exist.
    pub db_path: PathBuf,
}

impl SqliteConfig {
    /// Create a new SQLite config pointing at `db_path`
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Open a fresh connection to the configured file.
    ///
    /// The file is opened read-write but never created: a missing file is a
    /// connection error rather than a new empty database. The connection is
    /// closed when the returned value is dropped.
    pub fn open(&self) -> Result<Connection> {
        // rusqlite maps "" to a private temporary database; reject it instead.
        if self.db_path.as_os_str().is_empty() {
            return Err(StoreError::Connection {
                path: self.db_path.clone(),
                source: rusqlite::Error::InvalidPath(self.db_path.clone()),
            });
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.db_path, flags).map_err(|source| {
            StoreError::Connection {
                path: self.db_path.clone(),
                source,
            }
        })?;
        debug!(path = %self.db_path.display(), "opened sqlite connection");
        Ok(conn)
    }
}

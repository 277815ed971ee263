//! Test utilities for database setup.
//!
//! Reuses the authoritative schema initialization so tests never duplicate
//! DDL.

use rusqlite::Connection;
use std::path::Path;
use tempfile::TempDir;

/// Test environment with a migrated database in a temporary directory,
/// cleaned up on drop.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    /// Database connection with the full schema applied
    pub conn: Connection,
}

impl TestEnv {
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let db_path = temp.path().join("cardly.db");
        let conn = Connection::open(&db_path)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        crate::db::schema::run_migrations(&conn)?;

        Ok(Self { temp, conn })
    }

    /// Get the temporary directory path for creating test files.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }
}

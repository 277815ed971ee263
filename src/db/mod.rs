pub mod cards;
pub mod collections;
pub mod schema;
pub mod sessions;
pub mod users;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Result};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use schema::run_migrations;

pub type DbPool = Arc<Mutex<Connection>>;

/// Error returned when the database lock cannot be acquired
#[derive(Debug)]
pub struct DbLockError;

impl std::fmt::Display for DbLockError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Database unavailable")
  }
}

impl std::error::Error for DbLockError {}

/// Try to acquire the database lock, returning an error if poisoned
pub fn try_lock(pool: &DbPool) -> std::result::Result<MutexGuard<'_, Connection>, DbLockError> {
  pool.lock().map_err(|_: PoisonError<_>| {
    tracing::error!("database mutex poisoned - a thread panicked while holding the lock");
    DbLockError
  })
}

pub fn init_db(path: &Path) -> Result<DbPool> {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).ok();
  }

  let conn = Connection::open(path)?;
  // Cascade deletes (collection -> cards, user -> sessions) need this on
  conn.pragma_update(None, "foreign_keys", true)?;
  schema::run_migrations(&conn)?;
  Ok(Arc::new(Mutex::new(conn)))
}

/// Parse an RFC3339 timestamp column, falling back to now on corruption
pub(crate) fn parse_timestamp(s: &str) -> DateTime<Utc> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .unwrap_or_else(|_| Utc::now())
}

/// Parse a nullable RFC3339 timestamp column
pub(crate) fn parse_optional_timestamp(s: Option<String>) -> Option<DateTime<Utc>> {
  s.and_then(|s| {
    DateTime::parse_from_rfc3339(&s)
      .map(|dt| dt.with_timezone(&Utc))
      .ok()
  })
}

//! Session table operations.
//!
//! The `id` column stores the SHA-256 digest of the bearer token, never
//! the token itself.

use chrono::{Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};

/// Create a new session keyed by token digest
pub fn create_session(
    conn: &Connection,
    user_id: i64,
    token_digest: &str,
    duration_hours: i64,
) -> Result<()> {
    let now = Utc::now();
    let expires = now + Duration::hours(duration_hours);
    conn.execute(
        r#"INSERT INTO sessions (id, user_id, created_at, expires_at, last_access_at)
           VALUES (?1, ?2, ?3, ?4, ?5)"#,
        params![
            token_digest,
            user_id,
            now.to_rfc3339(),
            expires.to_rfc3339(),
            now.to_rfc3339()
        ],
    )?;
    Ok(())
}

/// Resolve an unexpired session to its user, touching last access time
pub fn get_session_user(conn: &Connection, token_digest: &str) -> Result<Option<i64>> {
    let now = Utc::now().to_rfc3339();
    let user_id: Option<i64> = conn
        .query_row(
            "SELECT user_id FROM sessions WHERE id = ?1 AND expires_at > ?2",
            params![token_digest, now],
            |row| row.get(0),
        )
        .optional()?;

    if user_id.is_some() {
        let _ = conn.execute(
            "UPDATE sessions SET last_access_at = ?1 WHERE id = ?2",
            params![now, token_digest],
        );
    }
    Ok(user_id)
}

/// Delete a session (logout)
pub fn delete_session(conn: &Connection, token_digest: &str) -> Result<()> {
    conn.execute("DELETE FROM sessions WHERE id = ?1", params![token_digest])?;
    Ok(())
}

/// Cleanup expired sessions, returns count of deleted sessions
pub fn cleanup_expired_sessions(conn: &Connection) -> Result<usize> {
    let now = Utc::now().to_rfc3339();
    conn.execute("DELETE FROM sessions WHERE expires_at < ?1", params![now])
}

//! User table operations

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};

use crate::domain::{Plan, User};

/// Fields a profile update may change; `None` leaves the column untouched
#[derive(Debug, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub photo: Option<String>,
    pub plan: Option<Plan>,
}

fn row_to_user(row: &Row) -> Result<User> {
    let plan: String = row.get(4)?;
    let created_at: String = row.get(7)?;
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        photo: row.get(3)?,
        plan: Plan::from_str(&plan).unwrap_or_default(),
        generations_left: row.get(5)?,
        collections_left: row.get(6)?,
        created_at: super::parse_timestamp(&created_at),
    })
}

const USER_COLUMNS: &str =
    "id, name, email, photo, plan, generations_left, collections_left, created_at";

/// Create a new user on the free plan with default quotas, returns the user ID
pub fn create_user(
    conn: &Connection,
    name: &str,
    email: &str,
    password_hash: &str,
    generations_left: i64,
    collections_left: i64,
) -> Result<i64> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        r#"INSERT INTO users (name, email, password_hash, plan, generations_left, collections_left, created_at)
           VALUES (?1, ?2, ?3, 'free', ?4, ?5, ?6)"#,
        params![name, email, password_hash, generations_left, collections_left, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get credentials by email, returns (user_id, password_hash)
pub fn get_credentials_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<(i64, String)>> {
    conn.query_row(
        "SELECT id, password_hash FROM users WHERE email = ?1",
        params![email],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}

/// Check if an email is already registered
pub fn email_exists(conn: &Connection, email: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE email = ?1",
        params![email],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Get a user profile by ID
pub fn get_user(conn: &Connection, user_id: i64) -> Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        params![user_id],
        row_to_user,
    )
    .optional()
}

/// Apply a partial profile update
pub fn update_user(conn: &Connection, user_id: i64, update: &UserUpdate) -> Result<()> {
    conn.execute(
        r#"UPDATE users SET
               name = COALESCE(?1, name),
               email = COALESCE(?2, email),
               password_hash = COALESCE(?3, password_hash),
               photo = COALESCE(?4, photo),
               plan = COALESCE(?5, plan)
           WHERE id = ?6"#,
        params![
            update.name,
            update.email,
            update.password_hash,
            update.photo,
            update.plan.map(|p| p.as_str()),
            user_id,
        ],
    )?;
    Ok(())
}

/// Overwrite usage quotas; `None` leaves the column untouched
pub fn update_limits(
    conn: &Connection,
    user_id: i64,
    generations_left: Option<i64>,
    collections_left: Option<i64>,
) -> Result<()> {
    conn.execute(
        r#"UPDATE users SET
               generations_left = COALESCE(?1, generations_left),
               collections_left = COALESCE(?2, collections_left)
           WHERE id = ?3"#,
        params![generations_left, collections_left, user_id],
    )?;
    Ok(())
}

/// Spend one AI generation, never going below zero
pub fn decrement_generations(conn: &Connection, user_id: i64) -> Result<()> {
    conn.execute(
        "UPDATE users SET generations_left = MAX(0, generations_left - 1) WHERE id = ?1",
        params![user_id],
    )?;
    Ok(())
}

/// Spend one collection slot, never going below zero
pub fn decrement_collections(conn: &Connection, user_id: i64) -> Result<()> {
    conn.execute(
        "UPDATE users SET collections_left = MAX(0, collections_left - 1) WHERE id = ?1",
        params![user_id],
    )?;
    Ok(())
}

/// Refund one collection slot, capped at `cap`
pub fn refund_collection_slot(conn: &Connection, user_id: i64, cap: i64) -> Result<()> {
    conn.execute(
        "UPDATE users SET collections_left = MIN(?1, collections_left + 1) WHERE id = ?2",
        params![cap, user_id],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;

    #[test]
    fn test_create_and_get_user() {
        let env = TestEnv::new().unwrap();
        let id = create_user(&env.conn, "Ada", "ada@example.com", "hash", 15, 10).unwrap();

        let user = get_user(&env.conn, id).unwrap().unwrap();
        assert_eq!(user.name, "Ada");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.plan, Plan::Free);
        assert_eq!(user.generations_left, 15);
        assert_eq!(user.collections_left, 10);
        assert!(user.photo.is_none());
    }

    #[test]
    fn test_email_lookup_is_case_insensitive() {
        let env = TestEnv::new().unwrap();
        create_user(&env.conn, "Ada", "Ada@Example.com", "hash", 15, 10).unwrap();

        assert!(email_exists(&env.conn, "ada@example.com").unwrap());
        let creds = get_credentials_by_email(&env.conn, "ADA@EXAMPLE.COM").unwrap();
        assert!(creds.is_some());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let env = TestEnv::new().unwrap();
        create_user(&env.conn, "Ada", "ada@example.com", "hash", 15, 10).unwrap();
        let dup = create_user(&env.conn, "Eve", "ada@example.com", "hash2", 15, 10);
        assert!(dup.is_err());
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let env = TestEnv::new().unwrap();
        let id = create_user(&env.conn, "Ada", "ada@example.com", "hash", 15, 10).unwrap();

        let update = UserUpdate {
            name: Some("Ada L.".to_string()),
            plan: Some(Plan::Annual),
            ..Default::default()
        };
        update_user(&env.conn, id, &update).unwrap();

        let user = get_user(&env.conn, id).unwrap().unwrap();
        assert_eq!(user.name, "Ada L.");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.plan, Plan::Annual);
    }

    #[test]
    fn test_quota_decrement_stops_at_zero() {
        let env = TestEnv::new().unwrap();
        let id = create_user(&env.conn, "Ada", "ada@example.com", "hash", 1, 1).unwrap();

        decrement_generations(&env.conn, id).unwrap();
        decrement_generations(&env.conn, id).unwrap();
        decrement_collections(&env.conn, id).unwrap();
        decrement_collections(&env.conn, id).unwrap();

        let user = get_user(&env.conn, id).unwrap().unwrap();
        assert_eq!(user.generations_left, 0);
        assert_eq!(user.collections_left, 0);
    }

    #[test]
    fn test_refund_respects_cap() {
        let env = TestEnv::new().unwrap();
        let id = create_user(&env.conn, "Ada", "ada@example.com", "hash", 15, 10).unwrap();

        refund_collection_slot(&env.conn, id, 10).unwrap();
        let user = get_user(&env.conn, id).unwrap().unwrap();
        assert_eq!(user.collections_left, 10);
    }

    #[test]
    fn test_update_limits_partial() {
        let env = TestEnv::new().unwrap();
        let id = create_user(&env.conn, "Ada", "ada@example.com", "hash", 15, 10).unwrap();

        update_limits(&env.conn, id, Some(3), None).unwrap();
        let user = get_user(&env.conn, id).unwrap().unwrap();
        assert_eq!(user.generations_left, 3);
        assert_eq!(user.collections_left, 10);
    }
}

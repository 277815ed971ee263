//! Collection table operations.
//!
//! Every read is scoped to the owning user; a collection belonging to
//! someone else is indistinguishable from a missing one.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};

use crate::domain::Collection;

fn row_to_collection(row: &Row) -> Result<Collection> {
    let created_at: String = row.get(4)?;
    Ok(Collection {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        progress: row.get(3)?,
        created_at: super::parse_timestamp(&created_at),
    })
}

/// Create a collection, returns its ID
pub fn insert_collection(conn: &Connection, user_id: i64, name: &str) -> Result<i64> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO collections (user_id, name, progress, created_at) VALUES (?1, ?2, 0, ?3)",
        params![user_id, name, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get a collection owned by the given user
pub fn get_collection(
    conn: &Connection,
    collection_id: i64,
    user_id: i64,
) -> Result<Option<Collection>> {
    conn.query_row(
        r#"SELECT id, user_id, name, progress, created_at
           FROM collections WHERE id = ?1 AND user_id = ?2"#,
        params![collection_id, user_id],
        row_to_collection,
    )
    .optional()
}

/// All of a user's collections, newest first
pub fn list_collections(conn: &Connection, user_id: i64) -> Result<Vec<Collection>> {
    let mut stmt = conn.prepare(
        r#"SELECT id, user_id, name, progress, created_at
           FROM collections WHERE user_id = ?1
           ORDER BY created_at DESC, id DESC"#,
    )?;
    let collections = stmt
        .query_map(params![user_id], row_to_collection)?
        .collect::<Result<Vec<_>>>()?;
    Ok(collections)
}

/// Apply a partial update; `None` leaves the column untouched
pub fn update_collection(
    conn: &Connection,
    collection_id: i64,
    name: Option<&str>,
    progress: Option<f64>,
) -> Result<()> {
    conn.execute(
        r#"UPDATE collections SET
               name = COALESCE(?1, name),
               progress = COALESCE(?2, progress)
           WHERE id = ?3"#,
        params![name, progress, collection_id],
    )?;
    Ok(())
}

/// Delete a collection; its cards cascade
pub fn delete_collection(conn: &Connection, collection_id: i64) -> Result<()> {
    conn.execute("DELETE FROM collections WHERE id = ?1", params![collection_id])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::users::create_user;
    use crate::testing::TestEnv;

    fn user(env: &TestEnv, email: &str) -> i64 {
        create_user(&env.conn, "U", email, "h", 15, 10).unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let env = TestEnv::new().unwrap();
        let uid = user(&env, "a@example.com");
        let id = insert_collection(&env.conn, uid, "Biology").unwrap();

        let c = get_collection(&env.conn, id, uid).unwrap().unwrap();
        assert_eq!(c.name, "Biology");
        assert_eq!(c.progress, 0.0);
    }

    #[test]
    fn test_ownership_scoping() {
        let env = TestEnv::new().unwrap();
        let owner = user(&env, "a@example.com");
        let stranger = user(&env, "b@example.com");
        let id = insert_collection(&env.conn, owner, "Private").unwrap();

        assert!(get_collection(&env.conn, id, stranger).unwrap().is_none());
        assert!(get_collection(&env.conn, id, owner).unwrap().is_some());
    }

    #[test]
    fn test_list_newest_first() {
        let env = TestEnv::new().unwrap();
        let uid = user(&env, "a@example.com");
        let first = insert_collection(&env.conn, uid, "One").unwrap();
        let second = insert_collection(&env.conn, uid, "Two").unwrap();

        let ids: Vec<i64> = list_collections(&env.conn, uid)
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn test_partial_update() {
        let env = TestEnv::new().unwrap();
        let uid = user(&env, "a@example.com");
        let id = insert_collection(&env.conn, uid, "Biology").unwrap();

        update_collection(&env.conn, id, None, Some(42.5)).unwrap();
        let c = get_collection(&env.conn, id, uid).unwrap().unwrap();
        assert_eq!(c.name, "Biology");
        assert_eq!(c.progress, 42.5);
    }

    #[test]
    fn test_delete_cascades_to_cards() {
        let env = TestEnv::new().unwrap();
        let uid = user(&env, "a@example.com");
        let id = insert_collection(&env.conn, uid, "Biology").unwrap();
        crate::db::cards::insert_card(&env.conn, id, "q", "a").unwrap();

        delete_collection(&env.conn, id).unwrap();
        let remaining: i64 = env
            .conn
            .query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
    }
}

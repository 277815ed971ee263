//! Card table operations.
//!
//! The scheduling columns are materialized into a [`CardSchedule`] value
//! once per load; nothing downstream defaults them field by field.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};

use crate::domain::Card;
use crate::srs::CardSchedule;

const CARD_COLUMNS: &str = "id, collection_id, front, back, interval_minutes, ease_factor, \
                            repetitions, next_review_at, created_at";

fn row_to_card(row: &Row) -> Result<Card> {
    let next_review_at: Option<String> = row.get(7)?;
    let created_at: String = row.get(8)?;
    Ok(Card {
        id: row.get(0)?,
        collection_id: row.get(1)?,
        front: row.get(2)?,
        back: row.get(3)?,
        schedule: CardSchedule {
            interval_minutes: row.get(4)?,
            ease_factor: row.get(5)?,
            repetitions: row.get(6)?,
            next_review_at: super::parse_optional_timestamp(next_review_at),
        },
        created_at: super::parse_timestamp(&created_at),
    })
}

/// Create a card with a fresh schedule, returns its ID
pub fn insert_card(conn: &Connection, collection_id: i64, front: &str, back: &str) -> Result<i64> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        r#"INSERT INTO cards (collection_id, front, back, created_at)
           VALUES (?1, ?2, ?3, ?4)"#,
        params![collection_id, front, back, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Bulk-create cards, returns how many were inserted
pub fn insert_cards(
    conn: &Connection,
    collection_id: i64,
    cards: &[(String, String)],
) -> Result<usize> {
    let now = Utc::now().to_rfc3339();
    let mut stmt = conn.prepare(
        r#"INSERT INTO cards (collection_id, front, back, created_at)
           VALUES (?1, ?2, ?3, ?4)"#,
    )?;
    for (front, back) in cards {
        stmt.execute(params![collection_id, front, back, now])?;
    }
    Ok(cards.len())
}

/// Get a card only if its collection belongs to the given user
pub fn get_card_for_user(conn: &Connection, card_id: i64, user_id: i64) -> Result<Option<Card>> {
    conn.query_row(
        &format!(
            r#"SELECT {CARD_COLUMNS} FROM cards
               WHERE id = ?1
                 AND collection_id IN (SELECT id FROM collections WHERE user_id = ?2)"#,
        ),
        params![card_id, user_id],
        row_to_card,
    )
    .optional()
}

/// All cards of a collection, newest first (the browse order)
pub fn list_cards(conn: &Connection, collection_id: i64) -> Result<Vec<Card>> {
    let mut stmt = conn.prepare(&format!(
        r#"SELECT {CARD_COLUMNS} FROM cards
           WHERE collection_id = ?1
           ORDER BY created_at DESC, id DESC"#,
    ))?;
    let cards = stmt
        .query_map(params![collection_id], row_to_card)?
        .collect::<Result<Vec<_>>>()?;
    Ok(cards)
}

/// All cards of a collection in creation order, the order the due-set
/// selector expects for its tie-break
pub fn list_cards_in_creation_order(conn: &Connection, collection_id: i64) -> Result<Vec<Card>> {
    let mut stmt = conn.prepare(&format!(
        r#"SELECT {CARD_COLUMNS} FROM cards
           WHERE collection_id = ?1
           ORDER BY created_at ASC, id ASC"#,
    ))?;
    let cards = stmt
        .query_map(params![collection_id], row_to_card)?
        .collect::<Result<Vec<_>>>()?;
    Ok(cards)
}

/// Apply a partial content update; `None` leaves the column untouched
pub fn update_card_content(
    conn: &Connection,
    card_id: i64,
    front: Option<&str>,
    back: Option<&str>,
) -> Result<()> {
    conn.execute(
        r#"UPDATE cards SET
               front = COALESCE(?1, front),
               back = COALESCE(?2, back)
           WHERE id = ?3"#,
        params![front, back, card_id],
    )?;
    Ok(())
}

/// Persist the schedule a review produced. The whole value is written in
/// one statement so a card's scheduling state is never partially updated.
pub fn update_card_schedule(
    conn: &Connection,
    card_id: i64,
    schedule: &CardSchedule,
) -> Result<()> {
    conn.execute(
        r#"UPDATE cards SET
               interval_minutes = ?1,
               ease_factor = ?2,
               repetitions = ?3,
               next_review_at = ?4
           WHERE id = ?5"#,
        params![
            schedule.interval_minutes,
            schedule.ease_factor,
            schedule.repetitions,
            schedule.next_review_at.map(|t| t.to_rfc3339()),
            card_id,
        ],
    )?;
    Ok(())
}

pub fn delete_card(conn: &Connection, card_id: i64) -> Result<()> {
    conn.execute("DELETE FROM cards WHERE id = ?1", params![card_id])?;
    Ok(())
}

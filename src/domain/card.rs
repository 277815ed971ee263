use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::srs::CardSchedule;

/// A flashcard with its scheduling state.
///
/// The schedule is a single value type with defaults applied once when the
/// row is loaded; handlers never default individual fields at the point of
/// use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
  pub id: i64,
  pub collection_id: i64,
  pub front: String,
  pub back: String,
  #[serde(flatten)]
  pub schedule: CardSchedule,
  pub created_at: DateTime<Utc>,
}

impl Card {
  /// A card that has never been reviewed: default schedule, due now.
  pub fn new(collection_id: i64, front: String, back: String) -> Self {
    Self {
      id: 0,
      collection_id,
      front,
      back,
      schedule: CardSchedule::default(),
      created_at: Utc::now(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_new_card_defaults() {
    let card = Card::new(3, "front".to_string(), "back".to_string());
    assert_eq!(card.id, 0);
    assert_eq!(card.collection_id, 3);
    assert_eq!(card.schedule.interval_minutes, 0);
    assert!((card.schedule.ease_factor - 2.5).abs() < f64::EPSILON);
    assert_eq!(card.schedule.repetitions, 0);
    assert!(card.schedule.next_review_at.is_none());
  }

  #[test]
  fn test_card_wire_shape_flattens_schedule() {
    let card = Card::new(1, "q".to_string(), "a".to_string());
    let json = serde_json::to_value(&card).unwrap();
    // Schedule fields sit at the top level of the card object
    assert_eq!(json["intervalMinutes"], 0);
    assert_eq!(json["easeFactor"], 2.5);
    assert_eq!(json["repetitions"], 0);
    assert!(json["nextReviewAt"].is_null());
    assert_eq!(json["collectionId"], 1);
  }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Card;

/// A named set of cards owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
  pub id: i64,
  pub user_id: i64,
  pub name: String,
  /// Study progress percentage, 0 to 100. Maintained by the client.
  pub progress: f64,
  pub created_at: DateTime<Utc>,
}

/// Collection plus its cards, the shape list/detail endpoints return.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionWithCards {
  #[serde(flatten)]
  pub collection: Collection,
  pub cards: Vec<Card>,
  pub card_count: usize,
}

impl CollectionWithCards {
  pub fn new(collection: Collection, cards: Vec<Card>) -> Self {
    let card_count = cards.len();
    Self {
      collection,
      cards,
      card_count,
    }
  }
}

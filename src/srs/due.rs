//! Due-set selection over a collection's cards.
//!
//! The predicate and ordering live here, independent of the storage
//! engine: the database hands over (id, next_review_at) pairs in creation
//! order and gets back the ordered ids of the cards eligible for review.
//! The selection is a pure projection: no mutation, and identical inputs
//! with the same `now` always produce identical output.

use chrono::{DateTime, Utc};

/// Minimal card projection needed to decide and order the due set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DueCandidate {
  pub id: i64,
  /// `None` means never reviewed: due immediately, ahead of everything.
  pub next_review_at: Option<DateTime<Utc>>,
}

/// Select the cards eligible for review at `now`, ordered for study.
///
/// A card qualifies when it has never been reviewed or its next-review
/// time has passed. Never-reviewed cards come first, the rest ascend by
/// next-review time; ties keep the caller's (creation) order because the
/// sort is stable.
pub fn select_due(cards: &[DueCandidate], now: DateTime<Utc>) -> Vec<i64> {
  let mut due: Vec<&DueCandidate> = cards
    .iter()
    .filter(|c| match c.next_review_at {
      None => true,
      Some(at) => at <= now,
    })
    .collect();

  // Option orders None before Some, which is exactly the null-first rule
  due.sort_by_key(|c| c.next_review_at);
  due.iter().map(|c| c.id).collect()
}

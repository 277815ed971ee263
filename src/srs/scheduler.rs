//! Review scheduling: a simplified SM-2 variant over minute-granularity
//! intervals.
//!
//! `schedule` is a pure function of (current state, rating, now). It never
//! fails: the rating enum is closed and every well-formed prior state is a
//! valid input. Persistence of the returned state is the caller's job.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Ease factor never drops below this floor. There is no ceiling.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor assigned to a card with no review history.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Interval after the first "easy" on a fresh card: four days in minutes.
const FIRST_EASY_INTERVAL_MINUTES: i64 = 4 * 24 * 60;

/// Learner's self-assessed recall quality for one review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
  Again,
  Hard,
  Good,
  Easy,
}

impl Rating {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Again => "again",
      Self::Hard => "hard",
      Self::Good => "good",
      Self::Easy => "easy",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "again" => Some(Self::Again),
      "hard" => Some(Self::Hard),
      "good" => Some(Self::Good),
      "easy" => Some(Self::Easy),
      _ => None,
    }
  }
}

/// Scheduling state of a single card. Owned 1:1 by the card; mutated
/// exactly once per review by replacing it with the value `schedule`
/// returns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSchedule {
  /// Minutes until the next review, as of the last review.
  pub interval_minutes: i64,
  /// Difficulty multiplier; clamped to [`MIN_EASE_FACTOR`], unbounded above.
  pub ease_factor: f64,
  /// Consecutive non-"again" reviews since the last reset.
  pub repetitions: i64,
  /// `None` means never reviewed: immediately due.
  pub next_review_at: Option<DateTime<Utc>>,
}

impl Default for CardSchedule {
  fn default() -> Self {
    Self {
      interval_minutes: 0,
      ease_factor: DEFAULT_EASE_FACTOR,
      repetitions: 0,
      next_review_at: None,
    }
  }
}

/// Compute the next scheduling state for a card.
///
/// Branching on `repetitions == 0` rather than `interval_minutes == 0`
/// means a card knocked back by "again" earns the first-repetition bonus
/// interval once it is answered well again, instead of compounding its
/// pre-reset interval.
pub fn schedule(state: &CardSchedule, rating: Rating, now: DateTime<Utc>) -> CardSchedule {
  let (ease_factor, interval_minutes, repetitions) = match rating {
    Rating::Again => {
      // Forgetting resets progress but degrades ease gently.
      let ease = (state.ease_factor - 0.2).max(MIN_EASE_FACTOR);
      (ease, 1, 0)
    }
    Rating::Hard => {
      let ease = (state.ease_factor - 0.15).max(MIN_EASE_FACTOR);
      let interval = if state.repetitions == 0 {
        5
      } else {
        round_minutes(state.interval_minutes as f64 * 1.2).max(5)
      };
      (ease, interval, state.repetitions + 1)
    }
    Rating::Good => {
      let interval = if state.repetitions == 0 {
        10
      } else {
        round_minutes(state.interval_minutes as f64 * state.ease_factor)
      };
      (state.ease_factor, interval, state.repetitions + 1)
    }
    Rating::Easy => {
      let ease = state.ease_factor + 0.15;
      let interval = if state.repetitions == 0 {
        FIRST_EASY_INTERVAL_MINUTES
      } else {
        round_minutes(state.interval_minutes as f64 * ease * 1.3)
      };
      (ease, interval, state.repetitions + 1)
    }
  };

  CardSchedule {
    interval_minutes,
    ease_factor,
    repetitions,
    next_review_at: Some(now + Duration::minutes(interval_minutes)),
  }
}

/// Round half away from zero and truncate to whole minutes.
fn round_minutes(value: f64) -> i64 {
  value.round() as i64
}

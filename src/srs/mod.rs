pub mod due;
pub mod scheduler;

pub use due::{select_due, DueCandidate};
pub use scheduler::{schedule, CardSchedule, Rating, DEFAULT_EASE_FACTOR, MIN_EASE_FACTOR};

#![forbid(unsafe_code)]

pub mod model;
pub mod time;

pub use time::Clock;

/// Number of questions in a single quiz round.
pub const QUESTIONS_PER_ROUND: u32 = 10;

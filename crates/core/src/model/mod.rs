mod game;
mod movie;
mod question;
mod statistics;

pub use game::{GameRecord, GameRecordError};
pub use movie::{Movie, MovieError};
pub use question::{Claim, Comparison, Question};
pub use statistics::{StatisticsError, StatisticsSnapshot, StatisticsTotals};

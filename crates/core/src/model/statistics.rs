use thiserror::Error;

use crate::model::GameRecord;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StatisticsError {
    #[error("total correct ({correct}) exceeds total questions ({amount})")]
    CorrectExceedsAmount { correct: u64, amount: u64 },
    #[error("best game present but no games recorded")]
    BestWithoutGames,
}

/// Cumulative counters persisted across runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatisticsTotals {
    games_count: u32,
    total_correct: u64,
    total_amount: u64,
    best_game: Option<GameRecord>,
}

impl StatisticsTotals {
    /// Rehydrate totals from storage.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError` if the counters contradict each other.
    pub fn from_persisted(
        games_count: u32,
        total_correct: u64,
        total_amount: u64,
        best_game: Option<GameRecord>,
    ) -> Result<Self, StatisticsError> {
        if total_correct > total_amount {
            return Err(StatisticsError::CorrectExceedsAmount {
                correct: total_correct,
                amount: total_amount,
            });
        }
        if games_count == 0 && best_game.is_some() {
            return Err(StatisticsError::BestWithoutGames);
        }
        Ok(Self {
            games_count,
            total_correct,
            total_amount,
            best_game,
        })
    }

    #[must_use]
    pub fn games_count(&self) -> u32 {
        self.games_count
    }

    #[must_use]
    pub fn total_correct(&self) -> u64 {
        self.total_correct
    }

    #[must_use]
    pub fn total_amount(&self) -> u64 {
        self.total_amount
    }

    #[must_use]
    pub fn best_game(&self) -> Option<GameRecord> {
        self.best_game
    }

    /// Totals after adding one finished game.
    #[must_use]
    pub fn with_game(&self, game: GameRecord) -> Self {
        let best_game = match self.best_game {
            Some(best) if !game.is_better_than(&best) => Some(best),
            _ => Some(game),
        };
        Self {
            games_count: self.games_count.saturating_add(1),
            total_correct: self.total_correct.saturating_add(u64::from(game.correct())),
            total_amount: self.total_amount.saturating_add(u64::from(game.total())),
            best_game,
        }
    }

    /// Share of correct answers across every recorded game, in percent.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn total_accuracy(&self) -> f64 {
        if self.total_amount == 0 {
            return 0.0;
        }
        100.0 * self.total_correct as f64 / self.total_amount as f64
    }

    #[must_use]
    pub fn snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot {
            games_count: self.games_count,
            best_game: self.best_game,
            total_accuracy: self.total_accuracy(),
        }
    }
}

/// Read-only view used to compose the round summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticsSnapshot {
    pub games_count: u32,
    pub best_game: Option<GameRecord>,
    pub total_accuracy: f64,
}

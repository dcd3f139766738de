use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

use quiz_core::model::{GameRecord, StatisticsSnapshot, StatisticsTotals};
use storage::repository::StatisticsRepository;

use crate::Clock;
use crate::error::StatisticsStoreError;

/// Cumulative quiz statistics with write-through persistence.
///
/// Totals are cached in memory and only replaced after the repository has
/// accepted the new values, so `snapshot` always reflects the last successful
/// `record_game`.
pub struct StatisticsStore {
    clock: Clock,
    repo: Arc<dyn StatisticsRepository>,
    totals: Mutex<StatisticsTotals>,
}

impl StatisticsStore {
    /// Load persisted totals.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsStoreError::Storage` if the repository cannot be read.
    pub async fn load(
        clock: Clock,
        repo: Arc<dyn StatisticsRepository>,
    ) -> Result<Self, StatisticsStoreError> {
        let totals = repo.load_totals().await?;
        Ok(Self {
            clock,
            repo,
            totals: Mutex::new(totals),
        })
    }

    /// Record one finished game and persist the new totals before returning.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsStoreError::Record` for an impossible score and
    /// `StatisticsStoreError::Storage` if persisting fails. The cached totals are
    /// left untouched on error.
    pub async fn record_game(
        &self,
        correct: u32,
        total: u32,
    ) -> Result<StatisticsSnapshot, StatisticsStoreError> {
        let game = GameRecord::new(correct, total, self.clock.now())?;
        let updated = self.totals().with_game(game);

        self.repo.save_totals(&updated).await?;
        *self.totals.lock().unwrap_or_else(PoisonError::into_inner) = updated;

        info!(
            correct,
            total,
            games = updated.games_count(),
            "game recorded"
        );
        Ok(updated.snapshot())
    }

    #[must_use]
    pub fn snapshot(&self) -> StatisticsSnapshot {
        self.totals().snapshot()
    }

    fn totals(&self) -> StatisticsTotals {
        *self.totals.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

use async_trait::async_trait;
use quiz_core::model::StatisticsTotals;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Durable home of the cumulative quiz statistics.
#[async_trait]
pub trait StatisticsRepository: Send + Sync {
    /// Load the persisted totals; an empty store yields zeroed totals.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or holds invalid values.
    async fn load_totals(&self) -> Result<StatisticsTotals, StorageError>;

    /// Replace the persisted totals atomically.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the totals cannot be written.
    async fn save_totals(&self, totals: &StatisticsTotals) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    totals: Arc<Mutex<StatisticsTotals>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatisticsRepository for InMemoryRepository {
    async fn load_totals(&self) -> Result<StatisticsTotals, StorageError> {
        let guard = self
            .totals
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(*guard)
    }

    async fn save_totals(&self, totals: &StatisticsTotals) -> Result<(), StorageError> {
        let mut guard = self
            .totals
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = *totals;
        Ok(())
    }
}

/// Repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub statistics: Arc<dyn StatisticsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let statistics: Arc<dyn StatisticsRepository> = Arc::new(InMemoryRepository::new());
        Self { statistics }
    }
}

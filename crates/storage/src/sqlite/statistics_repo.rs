use std::collections::HashMap;

use async_trait::async_trait;
use quiz_core::model::StatisticsTotals;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{totals_from_pairs, totals_to_pairs};
use crate::repository::{StatisticsRepository, StorageError};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl StatisticsRepository for SqliteRepository {
    async fn load_totals(&self) -> Result<StatisticsTotals, StorageError> {
        let rows = sqlx::query("SELECT key, value FROM statistics")
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        let mut values = HashMap::with_capacity(rows.len());
        for row in rows {
            let key: String = row
                .try_get("key")
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            let value: String = row
                .try_get("value")
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            values.insert(key, value);
        }

        totals_from_pairs(&values)
    }

    async fn save_totals(&self, totals: &StatisticsTotals) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        for (key, value) in totals_to_pairs(totals) {
            sqlx::query(
                r"
                INSERT INTO statistics (key, value)
                VALUES (?1, ?2)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value
                ",
            )
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}

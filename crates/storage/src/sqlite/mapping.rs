use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use quiz_core::model::{GameRecord, StatisticsTotals};

use crate::repository::StorageError;

pub(crate) const GAMES_COUNT: &str = "games_count";
pub(crate) const TOTAL_CORRECT: &str = "total_correct";
pub(crate) const TOTAL_AMOUNT: &str = "total_amount";
pub(crate) const BEST_GAME_CORRECT: &str = "best_game_correct";
pub(crate) const BEST_GAME_TOTAL: &str = "best_game_total";
pub(crate) const BEST_GAME_DATE: &str = "best_game_date";

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn parse_number<T>(values: &HashMap<String, String>, key: &'static str) -> Result<T, StorageError>
where
    T: FromStr + Default,
    T::Err: core::fmt::Display,
{
    match values.get(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| StorageError::Serialization(format!("invalid {key}: {e}"))),
        None => Ok(T::default()),
    }
}

fn format_date(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::Serialization(format!("invalid {BEST_GAME_DATE}: {e}")))
}

/// Flattens totals into the persisted key-value pairs.
pub(crate) fn totals_to_pairs(totals: &StatisticsTotals) -> Vec<(&'static str, String)> {
    let mut pairs = vec![
        (GAMES_COUNT, totals.games_count().to_string()),
        (TOTAL_CORRECT, totals.total_correct().to_string()),
        (TOTAL_AMOUNT, totals.total_amount().to_string()),
    ];
    if let Some(best) = totals.best_game() {
        pairs.push((BEST_GAME_CORRECT, best.correct().to_string()));
        pairs.push((BEST_GAME_TOTAL, best.total().to_string()));
        pairs.push((BEST_GAME_DATE, format_date(best.date())));
    }
    pairs
}

/// Rebuilds totals from persisted key-value pairs. Missing counters read as zero.
pub(crate) fn totals_from_pairs(
    values: &HashMap<String, String>,
) -> Result<StatisticsTotals, StorageError> {
    let games_count: u32 = parse_number(values, GAMES_COUNT)?;
    let total_correct: u64 = parse_number(values, TOTAL_CORRECT)?;
    let total_amount: u64 = parse_number(values, TOTAL_AMOUNT)?;

    let best_game = match (
        values.get(BEST_GAME_CORRECT),
        values.get(BEST_GAME_TOTAL),
        values.get(BEST_GAME_DATE),
    ) {
        (None, None, None) => None,
        (Some(_), Some(_), Some(date)) => {
            let correct: u32 = parse_number(values, BEST_GAME_CORRECT)?;
            let total: u32 = parse_number(values, BEST_GAME_TOTAL)?;
            Some(GameRecord::new(correct, total, parse_date(date)?).map_err(ser)?)
        }
        _ => {
            return Err(StorageError::Serialization(
                "incomplete best game record".into(),
            ));
        }
    };

    StatisticsTotals::from_persisted(games_count, total_correct, total_amount, best_game)
        .map_err(ser)
}

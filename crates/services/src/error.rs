//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::GameRecordError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Any failure while loading the catalog or drawing a question.
///
/// The session treats every variant the same way (offer a retry); the variants
/// only exist for logs and the retry prompt text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NetworkError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server responded with status {0}")]
    HttpStatus(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("catalog service reported: {0}")]
    Api(String),
    #[error("movie catalog is empty")]
    EmptyCatalog,
    #[error("movie catalog has not been loaded")]
    CatalogNotLoaded,
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Malformed(err.to_string())
        } else if let Some(status) = err.status() {
            Self::HttpStatus(status.as_u16())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Errors emitted by `StatisticsStore`. Always fatal for the running session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatisticsStoreError {
    #[error(transparent)]
    Record(#[from] GameRecordError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the session controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("a question request is already in flight")]
    RequestInFlight,
    #[error("a result timer is already pending")]
    TimerAlreadyPending,
    #[error("failed to save statistics: {0}")]
    Statistics(#[from] StatisticsStoreError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error("MOVIEQUIZ_API_KEY is not set")]
    MissingApiKey,
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Statistics(#[from] StatisticsStoreError),
}

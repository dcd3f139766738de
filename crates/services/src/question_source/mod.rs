//! Where quiz questions come from.

mod imdb;
mod movie_source;

use async_trait::async_trait;
use quiz_core::model::{Movie, Question};
use url::Url;

use crate::error::NetworkError;

pub use imdb::ImdbClient;
pub use movie_source::MovieQuestionSource;

/// Asynchronous supplier of questions for a session.
///
/// Implementations never retry on their own; every failure is handed back to
/// the caller as a `NetworkError`.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch the candidate catalog. Safe to call again after a failure.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError` on transport failures, malformed payloads, or an
    /// empty catalog.
    async fn load_catalog(&self) -> Result<(), NetworkError>;

    /// Draw one question from the loaded catalog.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::CatalogNotLoaded` before a successful
    /// `load_catalog`, or a transport error if the poster cannot be fetched.
    async fn next_question(&self) -> Result<Question, NetworkError>;
}

/// Remote movie database used by `MovieQuestionSource`.
#[async_trait]
pub trait MovieCatalogClient: Send + Sync {
    /// # Errors
    ///
    /// Returns `NetworkError` if the catalog cannot be fetched or parsed.
    async fn fetch_movies(&self) -> Result<Vec<Movie>, NetworkError>;

    /// # Errors
    ///
    /// Returns `NetworkError` if the poster cannot be downloaded.
    async fn fetch_poster(&self, url: &Url) -> Result<Vec<u8>, NetworkError>;
}

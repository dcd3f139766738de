use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use quiz_core::model::{Claim, Comparison, Movie, Question};

use super::{MovieCatalogClient, QuestionSource};
use crate::error::NetworkError;

/// Draws rating questions from a cached movie catalog.
///
/// Movies are picked uniformly with replacement, so the same poster can come
/// up twice in one round.
pub struct MovieQuestionSource {
    client: Arc<dyn MovieCatalogClient>,
    movies: Mutex<Arc<Vec<Movie>>>,
    rng: Mutex<StdRng>,
}

impl MovieQuestionSource {
    #[must_use]
    pub fn new(client: Arc<dyn MovieCatalogClient>) -> Self {
        Self {
            client,
            movies: Mutex::new(Arc::new(Vec::new())),
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Use a deterministic random sequence.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    #[must_use]
    pub fn catalog_len(&self) -> usize {
        self.catalog().len()
    }

    fn catalog(&self) -> Arc<Vec<Movie>> {
        self.movies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Picks a movie and a claim about it in one go.
    fn draw(&self, movies: &[Movie]) -> Option<(Movie, Claim)> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let movie = movies.choose(&mut *rng)?.clone();
        let offset: i8 = rng.random_range(-1..=1);
        let comparison = if rng.random_bool(0.5) {
            Comparison::HigherThan
        } else {
            Comparison::LowerThan
        };
        let claim = Claim::near_rating(movie.rating(), offset, comparison);
        Some((movie, claim))
    }
}

#[async_trait]
impl QuestionSource for MovieQuestionSource {
    async fn load_catalog(&self) -> Result<(), NetworkError> {
        if !self.catalog().is_empty() {
            debug!("movie catalog already loaded");
            return Ok(());
        }

        let movies = self.client.fetch_movies().await?;
        if movies.is_empty() {
            return Err(NetworkError::EmptyCatalog);
        }
        info!(movies = movies.len(), "movie catalog loaded");
        *self.movies.lock().unwrap_or_else(PoisonError::into_inner) = Arc::new(movies);
        Ok(())
    }

    async fn next_question(&self) -> Result<Question, NetworkError> {
        let movies = self.catalog();
        let (movie, claim) = self.draw(&movies).ok_or(NetworkError::CatalogNotLoaded)?;

        let poster = self.client.fetch_poster(&movie.resized_image_url()).await?;
        debug!(title = movie.title(), %claim, "question drawn");
        Ok(Question::from_claim(poster, claim, movie.rating()))
    }
}

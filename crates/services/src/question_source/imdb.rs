use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use quiz_core::model::Movie;

use super::MovieCatalogClient;
use crate::error::NetworkError;

/// HTTP client for the IMDb-style "Top 250 movies" endpoint.
#[derive(Clone)]
pub struct ImdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ImdbClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn top_movies_url(&self) -> String {
        format!(
            "{}/Top250Movies/{}",
            self.base_url.trim_end_matches('/'),
            self.api_key
        )
    }
}

#[async_trait]
impl MovieCatalogClient for ImdbClient {
    async fn fetch_movies(&self) -> Result<Vec<Movie>, NetworkError> {
        let response = self.client.get(self.top_movies_url()).send().await?;
        ensure_success(response.status())?;
        let body = response.text().await?;
        parse_top_movies(&body)
    }

    async fn fetch_poster(&self, url: &Url) -> Result<Vec<u8>, NetworkError> {
        let response = self.client.get(url.clone()).send().await?;
        ensure_success(response.status())?;
        let bytes = response.bytes().await?;
        poster_from_body(&bytes)
    }
}

fn ensure_success(status: StatusCode) -> Result<(), NetworkError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(NetworkError::HttpStatus(status.as_u16()))
    }
}

/// A poster is only usable if the body carries image bytes.
fn poster_from_body(body: &[u8]) -> Result<Vec<u8>, NetworkError> {
    if body.is_empty() {
        return Err(NetworkError::Malformed("empty poster body".into()));
    }
    Ok(body.to_vec())
}

#[derive(Debug, Deserialize)]
struct TopMoviesResponse {
    #[serde(rename = "errorMessage", default)]
    error_message: String,
    #[serde(default)]
    items: Vec<TopMovieItem>,
}

#[derive(Debug, Deserialize)]
struct TopMovieItem {
    #[serde(rename = "fullTitle", default)]
    full_title: String,
    #[serde(rename = "imDbRating", default)]
    rating: String,
    #[serde(rename = "image", default)]
    image_url: String,
}

/// Parses the catalog payload, skipping entries without a usable rating or poster.
fn parse_top_movies(body: &str) -> Result<Vec<Movie>, NetworkError> {
    let response: TopMoviesResponse =
        serde_json::from_str(body).map_err(|e| NetworkError::Malformed(e.to_string()))?;

    if !response.error_message.trim().is_empty() {
        return Err(NetworkError::Api(response.error_message));
    }

    let mut movies = Vec::with_capacity(response.items.len());
    for item in response.items {
        let Ok(rating) = item.rating.trim().parse::<f32>() else {
            debug!(title = %item.full_title, raw = %item.rating, "skipping movie without rating");
            continue;
        };
        match Movie::new(item.full_title, rating, &item.image_url) {
            Ok(movie) => movies.push(movie),
            Err(err) => debug!(%err, "skipping invalid catalog entry"),
        }
    }

    if movies.is_empty() {
        return Err(NetworkError::EmptyCatalog);
    }
    Ok(movies)
}

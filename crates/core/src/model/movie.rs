use thiserror::Error;
use url::Url;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum MovieError {
    #[error("movie title cannot be empty")]
    EmptyTitle,
    #[error("rating {0} is outside 0..=10")]
    RatingOutOfRange(f32),
    #[error("invalid poster url: {0}")]
    InvalidPosterUrl(String),
}

/// One entry of the movie catalog questions are drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    title: String,
    rating: f32,
    image_url: Url,
}

impl Movie {
    /// Creates a catalog entry.
    ///
    /// # Errors
    ///
    /// Returns `MovieError` if the title is blank, the rating is not a number in
    /// `0..=10`, or the poster URL does not parse.
    pub fn new(
        title: impl Into<String>,
        rating: f32,
        image_url: &str,
    ) -> Result<Self, MovieError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(MovieError::EmptyTitle);
        }
        if !(0.0..=10.0).contains(&rating) {
            return Err(MovieError::RatingOutOfRange(rating));
        }
        let image_url =
            Url::parse(image_url).map_err(|e| MovieError::InvalidPosterUrl(e.to_string()))?;
        Ok(Self {
            title,
            rating,
            image_url,
        })
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn rating(&self) -> f32 {
        self.rating
    }

    #[must_use]
    pub fn image_url(&self) -> &Url {
        &self.image_url
    }

    /// Poster URL rewritten to the fixed 600px-wide rendition.
    ///
    /// Catalog images come in full resolution (`..._V1_Ratio0.6716_AL_.jpg`);
    /// everything from the first `._` onwards is a rendition suffix.
    #[must_use]
    pub fn resized_image_url(&self) -> Url {
        let raw = self.image_url.as_str();
        let Some((prefix, _)) = raw.split_once("._") else {
            return self.image_url.clone();
        };
        Url::parse(&format!("{prefix}._V0_UX600_.jpg")).unwrap_or_else(|_| self.image_url.clone())
    }
}

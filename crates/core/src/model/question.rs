use std::fmt;

/// Direction of a rating claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    HigherThan,
    LowerThan,
}

/// A yes/no statement about a movie's rating, e.g. "rated higher than 7".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim {
    comparison: Comparison,
    threshold: u8,
}

impl Claim {
    pub const MIN_THRESHOLD: u8 = 1;
    pub const MAX_THRESHOLD: u8 = 9;

    /// Builds a claim; the threshold is clamped into `1..=9`.
    #[must_use]
    pub fn new(comparison: Comparison, threshold: u8) -> Self {
        Self {
            comparison,
            threshold: threshold.clamp(Self::MIN_THRESHOLD, Self::MAX_THRESHOLD),
        }
    }

    /// Builds a claim whose threshold sits `offset` steps away from the rounded rating.
    #[must_use]
    pub fn near_rating(rating: f32, offset: i8, comparison: Comparison) -> Self {
        let rounded = rating.round().clamp(0.0, 10.0) as i16;
        let threshold = (rounded + i16::from(offset)).clamp(
            i16::from(Self::MIN_THRESHOLD),
            i16::from(Self::MAX_THRESHOLD),
        );
        Self::new(comparison, u8::try_from(threshold).unwrap_or(Self::MAX_THRESHOLD))
    }

    #[must_use]
    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    #[must_use]
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Whether the claim holds for the given rating.
    #[must_use]
    pub fn holds_for(&self, rating: f32) -> bool {
        let threshold = f32::from(self.threshold);
        match self.comparison {
            Comparison::HigherThan => rating > threshold,
            Comparison::LowerThan => rating < threshold,
        }
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.comparison {
            Comparison::HigherThan => "higher",
            Comparison::LowerThan => "lower",
        };
        write!(f, "Is this movie rated {direction} than {}?", self.threshold)
    }
}

/// A poster paired with a true/false claim about the movie's rating.
#[derive(Clone, PartialEq, Eq)]
pub struct Question {
    image: Vec<u8>,
    text: String,
    correct_answer: bool,
}

impl Question {
    #[must_use]
    pub fn new(image: Vec<u8>, text: impl Into<String>, correct_answer: bool) -> Self {
        Self {
            image,
            text: text.into(),
            correct_answer,
        }
    }

    /// Builds the question for a movie's rating from a claim.
    #[must_use]
    pub fn from_claim(image: Vec<u8>, claim: Claim, rating: f32) -> Self {
        Self::new(image, claim.to_string(), claim.holds_for(rating))
    }

    /// Raw poster bytes as downloaded; decoding is the display's concern.
    #[must_use]
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether "yes" is the right answer.
    #[must_use]
    pub fn correct_answer(&self) -> bool {
        self.correct_answer
    }

    #[must_use]
    pub fn is_correct(&self, given: bool) -> bool {
        given == self.correct_answer
    }
}

impl fmt::Debug for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Question")
            .field("image_len", &self.image.len())
            .field("text", &self.text)
            .field("correct_answer", &self.correct_answer)
            .finish()
    }
}

use std::env;
use std::time::Duration;

/// Delay between showing an answer's result and moving on.
pub const DEFAULT_RESULT_DELAY: Duration = Duration::from_secs(1);

pub const DEFAULT_API_BASE_URL: &str = "https://tv-api.com/en/API";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizConfig {
    pub api_base_url: String,
    pub api_key: Option<String>,
    pub result_delay: Duration,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            api_key: None,
            result_delay: DEFAULT_RESULT_DELAY,
        }
    }
}

impl QuizConfig {
    /// Reads `MOVIEQUIZ_API_KEY`, `MOVIEQUIZ_API_BASE_URL` and `MOVIEQUIZ_RESULT_DELAY_MS`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup. Blank or unparsable
    /// values fall back to defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_key = non_blank("MOVIEQUIZ_API_KEY").map(|value| value.trim().to_string());
        let api_base_url = non_blank("MOVIEQUIZ_API_BASE_URL")
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);
        let result_delay = non_blank("MOVIEQUIZ_RESULT_DELAY_MS")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map_or(defaults.result_delay, Duration::from_millis);

        Self {
            api_base_url,
            api_key,
            result_delay,
        }
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

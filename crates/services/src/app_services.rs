use std::sync::Arc;

use storage::repository::Storage;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::Clock;
use crate::config::QuizConfig;
use crate::error::AppServicesError;
use crate::question_source::{ImdbClient, MovieQuestionSource, QuestionSource};
use crate::sessions::{QuizDisplay, SessionController, SessionEvent};
use crate::statistics_service::StatisticsStore;

/// Assembles the question source and statistics store a session needs.
#[derive(Clone)]
pub struct AppServices {
    config: QuizConfig,
    source: Arc<dyn QuestionSource>,
    statistics: Arc<StatisticsStore>,
}

impl AppServices {
    /// Build services backed by `SQLite` statistics and the HTTP movie catalog.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if no API key is configured, storage
    /// initialization fails, or stored statistics cannot be loaded.
    pub async fn new_sqlite(
        db_url: &str,
        config: QuizConfig,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(AppServicesError::MissingApiKey)?;
        let storage = Storage::sqlite(db_url).await?;
        let client = Arc::new(ImdbClient::new(config.api_base_url.clone(), api_key));
        let source: Arc<dyn QuestionSource> = Arc::new(MovieQuestionSource::new(client));
        Self::from_parts(storage, source, config, clock).await
    }

    /// Build services from already constructed collaborators.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Statistics` if stored statistics cannot be loaded.
    pub async fn from_parts(
        storage: Storage,
        source: Arc<dyn QuestionSource>,
        config: QuizConfig,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let statistics = Arc::new(StatisticsStore::load(clock, storage.statistics).await?);
        Ok(Self {
            config,
            source,
            statistics,
        })
    }

    #[must_use]
    pub fn statistics(&self) -> Arc<StatisticsStore> {
        Arc::clone(&self.statistics)
    }

    /// A controller wired to these services and the given display.
    #[must_use]
    pub fn session_controller(
        &self,
        display: Arc<dyn QuizDisplay>,
    ) -> (SessionController, UnboundedReceiver<SessionEvent>) {
        let (controller, events) =
            SessionController::new(Arc::clone(&self.source), self.statistics(), display);
        (controller.with_result_delay(self.config.result_delay), events)
    }
}

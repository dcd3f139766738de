#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod question_source;
pub mod sessions;
pub mod statistics_service;

pub use quiz_core::{Clock, QUESTIONS_PER_ROUND};

pub use app_services::AppServices;
pub use config::QuizConfig;
pub use error::{AppServicesError, NetworkError, SessionError, StatisticsStoreError};
pub use question_source::{ImdbClient, MovieCatalogClient, MovieQuestionSource, QuestionSource};
pub use sessions::{
    QuizDisplay, QuizResultsView, QuizStepView, Responder, RetryPrompt, SessionController,
    SessionEvent, SessionHandle, SessionPhase, SessionState,
};
pub use statistics_service::StatisticsStore;

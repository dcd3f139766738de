use crate::error::NetworkError;

use super::events::Responder;

/// One question as the display should render it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizStepView {
    pub image: Vec<u8>,
    pub question: String,
    /// 1-based progress label, e.g. `"3/10"`.
    pub question_number: String,
}

/// End-of-round summary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizResultsView {
    pub title: String,
    pub message: String,
    pub button_text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPrompt {
    pub title: String,
    pub message: String,
    pub button_text: String,
}

impl RetryPrompt {
    #[must_use]
    pub fn network(err: &NetworkError) -> Self {
        Self {
            title: "Something went wrong".into(),
            message: format!("Unable to load data ({err})"),
            button_text: "Try again".into(),
        }
    }
}

/// Rendering side of a quiz session.
///
/// The display owns the controller's lifetime and reaches it only through a
/// `SessionHandle` or the `Responder`s passed in here, so neither side keeps
/// the other alive.
pub trait QuizDisplay: Send + Sync {
    fn show_question(&self, step: &QuizStepView);

    fn lock_input(&self);

    fn unlock_input(&self);

    fn show_answer_highlight(&self, is_correct: bool);

    fn hide_answer_highlight(&self) {}

    fn show_loading_indicator(&self) {}

    fn hide_loading_indicator(&self) {}

    fn show_summary(&self, results: &QuizResultsView, on_acknowledge: Responder);

    fn show_retry_prompt(&self, prompt: &RetryPrompt, on_retry: Responder);

    /// Unrecoverable failure; no retry is offered.
    fn show_fatal_error(&self, message: &str);
}

use quiz_core::model::Question;

/// Where the round currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// Waiting for the catalog or the next question.
    Loading,
    AwaitingAnswer,
    /// Answer highlighted, result timer pending.
    ShowingResult,
    Summary,
    /// A source operation failed; waiting for the user to retry.
    Error,
}

/// The source operation a retry has to replay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingStep {
    LoadCatalog,
    NextQuestion,
}

/// Per-round progress.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    question_index: u32,
    correct_count: u32,
    current_question: Option<Question>,
    input_locked: bool,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero-based index of the question being asked.
    #[must_use]
    pub fn question_index(&self) -> u32 {
        self.question_index
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.current_question.as_ref()
    }

    #[must_use]
    pub fn input_locked(&self) -> bool {
        self.input_locked
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn set_input_locked(&mut self, locked: bool) {
        self.input_locked = locked;
    }

    pub(crate) fn set_question(&mut self, question: Option<Question>) {
        self.current_question = question;
    }

    /// Scores an answer against the current question. `None` if nothing is being asked.
    pub(crate) fn record_answer(&mut self, given: bool) -> Option<bool> {
        let is_correct = self.current_question.as_ref()?.is_correct(given);
        if is_correct {
            self.correct_count += 1;
        }
        debug_assert!(self.correct_count <= self.question_index + 1);
        Some(is_correct)
    }

    pub(crate) fn advance(&mut self) {
        self.question_index += 1;
    }
}

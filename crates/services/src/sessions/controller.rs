use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use quiz_core::QUESTIONS_PER_ROUND;
use quiz_core::model::Question;

use crate::config::DEFAULT_RESULT_DELAY;
use crate::error::{NetworkError, SessionError};
use crate::question_source::QuestionSource;
use crate::statistics_service::StatisticsStore;

use super::display::{QuizDisplay, QuizStepView, RetryPrompt};
use super::events::{Responder, SessionEvent, SessionHandle};
use super::state::{PendingStep, SessionPhase, SessionState};
use super::summary::results_view;
use super::tasks::{InFlightRequest, ResultTimer};

/// Drives one quiz round after another.
///
/// All state changes happen inside `handle`, one event at a time. Source
/// requests and the result timer run as spawned tasks that post their
/// completion back as events tagged with the generation they were issued
/// under. At most one of them is outstanding at any moment.
pub struct SessionController {
    source: Arc<dyn QuestionSource>,
    statistics: Arc<StatisticsStore>,
    display: Arc<dyn QuizDisplay>,
    events: UnboundedSender<SessionEvent>,
    phase: SessionPhase,
    state: SessionState,
    started: bool,
    catalog_loaded: bool,
    generation: u64,
    request: Option<InFlightRequest>,
    timer: Option<ResultTimer>,
    failed_step: Option<PendingStep>,
    result_delay: Duration,
}

impl SessionController {
    /// Creates a controller and the receiving end of its event queue.
    #[must_use]
    pub fn new(
        source: Arc<dyn QuestionSource>,
        statistics: Arc<StatisticsStore>,
        display: Arc<dyn QuizDisplay>,
    ) -> (Self, UnboundedReceiver<SessionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let controller = Self {
            source,
            statistics,
            display,
            events,
            phase: SessionPhase::Loading,
            state: SessionState::new(),
            started: false,
            catalog_loaded: false,
            generation: 0,
            request: None,
            timer: None,
            failed_step: None,
            result_delay: DEFAULT_RESULT_DELAY,
        };
        (controller, rx)
    }

    #[must_use]
    pub fn with_result_delay(mut self, delay: Duration) -> Self {
        self.result_delay = delay;
        self
    }

    #[must_use]
    pub fn session_handle(&self) -> SessionHandle {
        SessionHandle::new(self.events.clone())
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Generation the next accepted completion must carry.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn has_pending_timer(&self) -> bool {
        self.timer.is_some()
    }

    #[must_use]
    pub fn has_request_in_flight(&self) -> bool {
        self.request.is_some()
    }

    /// Processes events until `Shutdown` arrives or a fatal error occurs.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when statistics cannot be persisted or an internal
    /// invariant is broken.
    pub async fn run(
        mut self,
        mut events: UnboundedReceiver<SessionEvent>,
    ) -> Result<(), SessionError> {
        while let Some(event) = events.recv().await {
            if matches!(event, SessionEvent::Shutdown) {
                self.cancel_pending();
                break;
            }
            self.handle(event).await?;
        }
        Ok(())
    }

    /// Applies a single event.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Statistics` if the finished round cannot be
    /// persisted, or an invariant error if a second request or timer would be
    /// started while one is outstanding.
    pub async fn handle(&mut self, event: SessionEvent) -> Result<(), SessionError> {
        match event {
            SessionEvent::Start => self.on_start(),
            SessionEvent::CatalogLoaded { generation, result } => {
                self.on_catalog_loaded(generation, result)
            }
            SessionEvent::QuestionReceived { generation, result } => {
                self.on_question_received(generation, result)
            }
            SessionEvent::Answer(given) => self.on_answer(given),
            SessionEvent::ResultTimerElapsed { generation } => {
                self.on_timer_elapsed(generation).await
            }
            SessionEvent::RetryConfirmed { generation } => self.on_retry(generation),
            SessionEvent::SummaryAcknowledged { generation } => self.on_acknowledged(generation),
            SessionEvent::Shutdown => {
                self.cancel_pending();
                Ok(())
            }
        }
    }

    fn on_start(&mut self) -> Result<(), SessionError> {
        if self.started {
            debug!("session already started");
            return Ok(());
        }
        self.started = true;
        info!("session started");
        self.issue(PendingStep::LoadCatalog)
    }

    fn on_catalog_loaded(
        &mut self,
        generation: u64,
        result: Result<(), NetworkError>,
    ) -> Result<(), SessionError> {
        if !self.accepts(generation, SessionPhase::Loading) {
            return Ok(());
        }
        self.request = None;
        match result {
            Ok(()) => {
                self.catalog_loaded = true;
                self.issue(PendingStep::NextQuestion)
            }
            Err(err) => {
                self.fail(PendingStep::LoadCatalog, &err);
                Ok(())
            }
        }
    }

    fn on_question_received(
        &mut self,
        generation: u64,
        result: Result<Question, NetworkError>,
    ) -> Result<(), SessionError> {
        if !self.accepts(generation, SessionPhase::Loading) {
            return Ok(());
        }
        self.request = None;
        match result {
            Ok(question) => {
                let step = QuizStepView {
                    image: question.image().to_vec(),
                    question: question.text().to_string(),
                    question_number: format!(
                        "{}/{}",
                        self.state.question_index() + 1,
                        QUESTIONS_PER_ROUND
                    ),
                };
                self.state.set_question(Some(question));
                self.state.set_input_locked(false);
                self.phase = SessionPhase::AwaitingAnswer;

                self.display.hide_loading_indicator();
                self.display.show_question(&step);
                self.display.unlock_input();
            }
            Err(err) => self.fail(PendingStep::NextQuestion, &err),
        }
        Ok(())
    }

    fn on_answer(&mut self, given: bool) -> Result<(), SessionError> {
        if self.phase != SessionPhase::AwaitingAnswer || self.state.input_locked() {
            debug!(phase = ?self.phase, "answer ignored while input is locked");
            return Ok(());
        }
        if self.timer.is_some() {
            return Err(SessionError::TimerAlreadyPending);
        }
        let Some(is_correct) = self.state.record_answer(given) else {
            debug!("answer ignored without a question");
            return Ok(());
        };

        self.state.set_input_locked(true);
        self.phase = SessionPhase::ShowingResult;
        self.display.lock_input();
        self.display.show_answer_highlight(is_correct);

        let generation = self.next_generation();
        self.timer = Some(ResultTimer::schedule(
            self.result_delay,
            generation,
            self.events.clone(),
        ));
        debug!(
            index = self.state.question_index(),
            is_correct, generation, "answer recorded"
        );
        Ok(())
    }

    async fn on_timer_elapsed(&mut self, generation: u64) -> Result<(), SessionError> {
        let matches_timer = self
            .timer
            .as_ref()
            .is_some_and(|timer| timer.generation() == generation);
        if !matches_timer || !self.accepts(generation, SessionPhase::ShowingResult) {
            return Ok(());
        }
        self.timer = None;
        self.display.hide_answer_highlight();

        if self.state.question_index() + 1 >= QUESTIONS_PER_ROUND {
            return self.finish().await;
        }
        self.state.advance();
        self.issue(PendingStep::NextQuestion)
    }

    fn on_retry(&mut self, generation: u64) -> Result<(), SessionError> {
        if !self.accepts(generation, SessionPhase::Error) {
            return Ok(());
        }
        let step = self.failed_step.take().unwrap_or(if self.catalog_loaded {
            PendingStep::NextQuestion
        } else {
            PendingStep::LoadCatalog
        });
        info!(?step, "retrying");
        self.issue(step)
    }

    fn on_acknowledged(&mut self, generation: u64) -> Result<(), SessionError> {
        if !self.accepts(generation, SessionPhase::Summary) {
            return Ok(());
        }
        self.cancel_pending();
        self.state.reset();
        self.failed_step = None;
        info!("new round");
        let step = if self.catalog_loaded {
            PendingStep::NextQuestion
        } else {
            PendingStep::LoadCatalog
        };
        self.issue(step)
    }

    async fn finish(&mut self) -> Result<(), SessionError> {
        let correct = self.state.correct_count();
        let snapshot = match self.statistics.record_game(correct, QUESTIONS_PER_ROUND).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                error!(%err, "failed to persist statistics");
                self.display.show_fatal_error(&err.to_string());
                return Err(SessionError::Statistics(err));
            }
        };

        self.phase = SessionPhase::Summary;
        self.state.set_question(None);
        let generation = self.next_generation();
        info!(correct, total = QUESTIONS_PER_ROUND, "round finished");

        let view = results_view(correct, QUESTIONS_PER_ROUND, &snapshot);
        let responder = Responder::new(
            self.events.clone(),
            SessionEvent::SummaryAcknowledged { generation },
        );
        self.display.show_summary(&view, responder);
        Ok(())
    }

    /// Enters `Loading` and starts `step` as the single outstanding request.
    fn issue(&mut self, step: PendingStep) -> Result<(), SessionError> {
        if let Some(request) = &self.request {
            warn!(pending = ?request.step(), ?step, "request already in flight");
            return Err(SessionError::RequestInFlight);
        }

        self.phase = SessionPhase::Loading;
        self.state.set_question(None);
        self.state.set_input_locked(true);
        self.display.lock_input();
        self.display.show_loading_indicator();

        let generation = self.next_generation();
        let source = Arc::clone(&self.source);
        let events = self.events.clone();
        debug!(?step, generation, "issuing request");

        let request = match step {
            PendingStep::LoadCatalog => InFlightRequest::spawn(step, generation, async move {
                let result = source.load_catalog().await;
                let _ = events.send(SessionEvent::CatalogLoaded { generation, result });
            }),
            PendingStep::NextQuestion => InFlightRequest::spawn(step, generation, async move {
                let result = source.next_question().await;
                let _ = events.send(SessionEvent::QuestionReceived { generation, result });
            }),
        };
        self.request = Some(request);
        Ok(())
    }

    fn fail(&mut self, step: PendingStep, err: &NetworkError) {
        warn!(?step, %err, "question source failed");
        self.request = None;
        self.failed_step = Some(step);
        self.phase = SessionPhase::Error;
        self.state.set_input_locked(true);
        self.display.hide_loading_indicator();
        self.display.lock_input();

        let generation = self.next_generation();
        let responder = Responder::new(
            self.events.clone(),
            SessionEvent::RetryConfirmed { generation },
        );
        self.display.show_retry_prompt(&RetryPrompt::network(err), responder);
    }

    fn accepts(&self, generation: u64, phase: SessionPhase) -> bool {
        if generation != self.generation || self.phase != phase {
            debug!(
                generation,
                current = self.generation,
                phase = ?self.phase,
                "dropping stale event"
            );
            return false;
        }
        if let Some(request) = &self.request {
            if request.generation() != generation {
                return false;
            }
        }
        true
    }

    /// Drops any in-flight request or timer and invalidates their completions.
    fn cancel_pending(&mut self) {
        self.request = None;
        self.timer = None;
        self.next_generation();
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

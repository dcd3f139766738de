use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use quiz_core::model::{Question, StatisticsTotals};
use quiz_core::time::fixed_now;
use services::{
    Clock, NetworkError, QUESTIONS_PER_ROUND, QuestionSource, QuizDisplay, QuizResultsView,
    QuizStepView, Responder, RetryPrompt, SessionController, SessionError, SessionEvent,
    SessionPhase, StatisticsStore,
};
use storage::repository::{InMemoryRepository, StatisticsRepository, StorageError};
use tokio::sync::mpsc::UnboundedReceiver;

#[derive(Default)]
struct ScriptedSource {
    loads: Mutex<VecDeque<Result<(), NetworkError>>>,
    questions: Mutex<VecDeque<Result<Question, NetworkError>>>,
    load_calls: AtomicUsize,
    question_calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(
        loads: Vec<Result<(), NetworkError>>,
        questions: Vec<Result<Question, NetworkError>>,
    ) -> Self {
        Self {
            loads: Mutex::new(loads.into()),
            questions: Mutex::new(questions.into()),
            ..Self::default()
        }
    }
}

#[async_trait]
impl QuestionSource for ScriptedSource {
    async fn load_catalog(&self) -> Result<(), NetworkError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        self.loads.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    async fn next_question(&self) -> Result<Question, NetworkError> {
        self.question_calls.fetch_add(1, Ordering::SeqCst);
        self.questions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Question::new(vec![1], "Filler?", true)))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Question(String),
    Lock,
    Unlock,
    Highlight(bool),
    Summary(QuizResultsView),
    Retry(RetryPrompt),
    Fatal(String),
}

#[derive(Default)]
struct RecordingDisplay {
    calls: Mutex<Vec<Call>>,
    summary: Mutex<Option<Responder>>,
    retry: Mutex<Option<Responder>>,
}

impl RecordingDisplay {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn take_summary(&self) -> Responder {
        self.summary.lock().unwrap().take().expect("summary shown")
    }

    fn take_retry(&self) -> Responder {
        self.retry.lock().unwrap().take().expect("retry prompt shown")
    }
}

impl QuizDisplay for RecordingDisplay {
    fn show_question(&self, step: &QuizStepView) {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Question(step.question_number.clone()));
    }

    fn lock_input(&self) {
        self.calls.lock().unwrap().push(Call::Lock);
    }

    fn unlock_input(&self) {
        self.calls.lock().unwrap().push(Call::Unlock);
    }

    fn show_answer_highlight(&self, is_correct: bool) {
        self.calls.lock().unwrap().push(Call::Highlight(is_correct));
    }

    fn show_summary(&self, results: &QuizResultsView, on_acknowledge: Responder) {
        self.calls.lock().unwrap().push(Call::Summary(results.clone()));
        *self.summary.lock().unwrap() = Some(on_acknowledge);
    }

    fn show_retry_prompt(&self, prompt: &RetryPrompt, on_retry: Responder) {
        self.calls.lock().unwrap().push(Call::Retry(prompt.clone()));
        *self.retry.lock().unwrap() = Some(on_retry);
    }

    fn show_fatal_error(&self, message: &str) {
        self.calls.lock().unwrap().push(Call::Fatal(message.to_string()));
    }
}

#[derive(Default)]
struct CountingRepository {
    inner: InMemoryRepository,
    saves: Mutex<Vec<StatisticsTotals>>,
    fail: bool,
}

#[async_trait]
impl StatisticsRepository for CountingRepository {
    async fn load_totals(&self) -> Result<StatisticsTotals, StorageError> {
        self.inner.load_totals().await
    }

    async fn save_totals(&self, totals: &StatisticsTotals) -> Result<(), StorageError> {
        if self.fail {
            return Err(StorageError::Connection("read-only filesystem".into()));
        }
        self.saves.lock().unwrap().push(*totals);
        self.inner.save_totals(totals).await
    }
}

struct Harness {
    controller: SessionController,
    events: UnboundedReceiver<SessionEvent>,
    source: Arc<ScriptedSource>,
    display: Arc<RecordingDisplay>,
    repo: Arc<CountingRepository>,
}

impl Harness {
    async fn new(source: ScriptedSource) -> Self {
        Self::with_repo(source, CountingRepository::default()).await
    }

    async fn with_repo(source: ScriptedSource, repo: CountingRepository) -> Self {
        let source = Arc::new(source);
        let display = Arc::new(RecordingDisplay::default());
        let repo = Arc::new(repo);
        let statistics = Arc::new(
            StatisticsStore::load(Clock::fixed(fixed_now()), repo.clone())
                .await
                .unwrap(),
        );
        let (controller, events) =
            SessionController::new(source.clone(), statistics, display.clone());
        Self {
            controller: controller.with_result_delay(Duration::ZERO),
            events,
            source,
            display,
            repo,
        }
    }

    /// Handles the next queued event.
    async fn pump(&mut self) -> Result<(), SessionError> {
        let event = self.events.recv().await.expect("event queued");
        self.controller.handle(event).await
    }

    async fn start(&mut self) {
        self.controller.handle(SessionEvent::Start).await.unwrap();
        self.pump().await.unwrap(); // catalog loaded
        self.pump().await.unwrap(); // first question
    }

    /// Answers the current question and lets the result timer fire.
    async fn answer(&mut self, yes: bool) -> Result<(), SessionError> {
        self.controller.handle(SessionEvent::Answer(yes)).await?;
        self.pump().await?; // timer elapsed
        if self.controller.phase() == SessionPhase::Loading {
            self.pump().await?; // next question
        }
        Ok(())
    }
}

fn claims(values: &[bool]) -> Vec<Result<Question, NetworkError>> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| Ok(Question::new(vec![i as u8], format!("Q{i}"), *v)))
        .collect()
}

#[tokio::test]
async fn full_round_counts_matching_answers() {
    let claims_ = [true, false, false, true, true, false, true, false, false, true];
    let answers = [true, true, false, true, false, false, true, true, false, true];
    let mut h = Harness::new(ScriptedSource::new(vec![], claims(&claims_))).await;
    h.start().await;

    for (i, answer) in answers.iter().enumerate() {
        assert_eq!(h.controller.phase(), SessionPhase::AwaitingAnswer);
        assert_eq!(h.controller.state().question_index(), i as u32);
        h.answer(*answer).await.unwrap();
    }

    let expected = claims_
        .iter()
        .zip(answers.iter())
        .filter(|(c, a)| c == a)
        .count() as u32;
    assert_eq!(expected, 7);
    assert_eq!(h.controller.phase(), SessionPhase::Summary);
    assert_eq!(h.controller.state().correct_count(), expected);

    let numbers: Vec<String> = h
        .display
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Question(n) => Some(n),
            _ => None,
        })
        .collect();
    let expected_numbers: Vec<String> = (1..=QUESTIONS_PER_ROUND)
        .map(|i| format!("{i}/{QUESTIONS_PER_ROUND}"))
        .collect();
    assert_eq!(numbers, expected_numbers);

    let saves = h.repo.saves.lock().unwrap().clone();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].best_game().map(|g| g.total()), Some(QUESTIONS_PER_ROUND));
    assert_eq!(h.source.load_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.source.question_calls.load(Ordering::SeqCst), 10);
}

#[tokio::test]
async fn summary_reports_first_then_improved_game() {
    let mut questions = claims(&[true; 10]);
    questions.extend(claims(&[true; 10]));
    let mut h = Harness::new(ScriptedSource::new(vec![], questions)).await;
    h.start().await;

    for i in 0..10 {
        h.answer(i < 6).await.unwrap();
    }
    let summary = h
        .display
        .calls()
        .into_iter()
        .rev()
        .find_map(|c| match c {
            Call::Summary(view) => Some(view),
            _ => None,
        })
        .unwrap();
    assert_eq!(summary.title, "This round is over!");
    assert!(summary.message.contains("Your result: 6/10"));
    assert!(summary.message.contains("Quizzes played: 1"));
    assert!(summary.message.contains("Record: 6/10 (14.11.23 22:13)"));
    assert!(summary.message.contains("Accuracy: 60.00%"));

    h.display.take_summary().respond();
    h.pump().await.unwrap(); // acknowledgement
    h.pump().await.unwrap(); // first question of the new round
    assert_eq!(h.controller.phase(), SessionPhase::AwaitingAnswer);
    assert_eq!(h.controller.state().question_index(), 0);
    assert_eq!(h.controller.state().correct_count(), 0);
    // The catalog is not fetched again for the next round.
    assert_eq!(h.source.load_calls.load(Ordering::SeqCst), 1);

    for i in 0..10 {
        h.answer(i < 8).await.unwrap();
    }
    let summary = h
        .display
        .calls()
        .into_iter()
        .rev()
        .find_map(|c| match c {
            Call::Summary(view) => Some(view),
            _ => None,
        })
        .unwrap();
    assert!(summary.message.contains("Quizzes played: 2"));
    assert!(summary.message.contains("Record: 8/10"));
    assert!(summary.message.contains("Accuracy: 70.00%"));
    assert_eq!(h.repo.saves.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn catalog_failure_offers_one_retry_and_replays_only_the_load() {
    let source = ScriptedSource::new(
        vec![Err(NetworkError::Transport("offline".into())), Ok(())],
        claims(&[true]),
    );
    let mut h = Harness::new(source).await;
    h.controller.handle(SessionEvent::Start).await.unwrap();
    h.pump().await.unwrap();

    assert_eq!(h.controller.phase(), SessionPhase::Error);
    assert_eq!(h.display.count(|c| matches!(c, Call::Retry(_))), 1);
    assert_eq!(h.source.question_calls.load(Ordering::SeqCst), 0);

    h.display.take_retry().respond();
    h.pump().await.unwrap(); // retry confirmed
    assert_eq!(h.controller.phase(), SessionPhase::Loading);
    h.pump().await.unwrap(); // catalog loaded
    assert_eq!(h.source.load_calls.load(Ordering::SeqCst), 2);
    h.pump().await.unwrap(); // question received

    assert_eq!(h.controller.phase(), SessionPhase::AwaitingAnswer);
    assert_eq!(h.source.question_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.display.count(|c| matches!(c, Call::Retry(_))), 1);
}

#[tokio::test]
async fn question_failure_retry_replays_only_the_question() {
    let mut questions = claims(&[true]);
    questions.push(Err(NetworkError::HttpStatus(503)));
    questions.extend(claims(&[false]));
    let mut h = Harness::new(ScriptedSource::new(vec![], questions)).await;
    h.start().await;

    h.answer(true).await.unwrap();
    assert_eq!(h.controller.phase(), SessionPhase::Error);
    assert_eq!(h.controller.state().question_index(), 1);
    assert_eq!(h.controller.state().correct_count(), 1);

    h.display.take_retry().respond();
    h.pump().await.unwrap(); // retry confirmed
    h.pump().await.unwrap(); // question received

    assert_eq!(h.controller.phase(), SessionPhase::AwaitingAnswer);
    assert_eq!(h.controller.state().question_index(), 1);
    assert_eq!(h.controller.state().correct_count(), 1);
    assert_eq!(h.source.load_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.source.question_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn second_retry_on_same_prompt_is_ignored() {
    let source = ScriptedSource::new(
        vec![Err(NetworkError::EmptyCatalog), Err(NetworkError::EmptyCatalog)],
        vec![],
    );
    let mut h = Harness::new(source).await;
    h.controller.handle(SessionEvent::Start).await.unwrap();
    h.pump().await.unwrap();

    let stale_generation = h.controller.generation();
    h.display.take_retry().respond();
    h.pump().await.unwrap();
    h.controller
        .handle(SessionEvent::RetryConfirmed {
            generation: stale_generation,
        })
        .await
        .unwrap();

    h.pump().await.unwrap(); // second load failure
    assert_eq!(h.source.load_calls.load(Ordering::SeqCst), 2);
    assert_eq!(h.display.count(|c| matches!(c, Call::Retry(_))), 2);
}

#[tokio::test]
async fn answers_are_ignored_while_input_is_locked() {
    let mut h = Harness::new(ScriptedSource::new(vec![], claims(&[true, true]))).await;
    h.start().await;

    h.controller.handle(SessionEvent::Answer(true)).await.unwrap();
    assert_eq!(h.controller.phase(), SessionPhase::ShowingResult);
    assert!(h.controller.state().input_locked());
    assert!(h.controller.has_pending_timer());

    h.controller.handle(SessionEvent::Answer(true)).await.unwrap();
    h.controller.handle(SessionEvent::Answer(false)).await.unwrap();
    assert_eq!(h.controller.state().correct_count(), 1);
    assert_eq!(h.display.count(|c| matches!(c, Call::Highlight(_))), 1);

    h.pump().await.unwrap(); // timer
    assert!(!h.controller.has_pending_timer());
    assert!(h.controller.has_request_in_flight());
    assert_eq!(h.controller.state().question_index(), 1);
}

#[tokio::test]
async fn answer_before_first_question_is_ignored() {
    let mut h = Harness::new(ScriptedSource::new(vec![], claims(&[true]))).await;
    h.controller.handle(SessionEvent::Answer(true)).await.unwrap();
    assert_eq!(h.controller.phase(), SessionPhase::Loading);
    assert_eq!(h.controller.state().correct_count(), 0);
    assert!(h.display.calls().is_empty());
}

#[tokio::test]
async fn stale_question_after_restart_does_not_touch_state() {
    let mut h = Harness::new(ScriptedSource::new(vec![], claims(&[true; 10]))).await;
    h.start().await;
    for _ in 0..10 {
        h.answer(true).await.unwrap();
    }
    let old_generation = h.controller.generation();

    h.display.take_summary().respond();
    h.pump().await.unwrap(); // acknowledged, new request in flight
    assert_eq!(h.controller.phase(), SessionPhase::Loading);

    h.controller
        .handle(SessionEvent::QuestionReceived {
            generation: old_generation,
            result: Ok(Question::new(vec![], "Stale?", false)),
        })
        .await
        .unwrap();
    assert_eq!(h.controller.phase(), SessionPhase::Loading);
    assert!(h.controller.state().current_question().is_none());

    h.pump().await.unwrap(); // real question
    assert_eq!(h.controller.phase(), SessionPhase::AwaitingAnswer);
    assert_ne!(
        h.controller.state().current_question().map(Question::text),
        Some("Stale?")
    );
}

#[tokio::test]
async fn stale_timer_is_ignored() {
    let mut h = Harness::new(ScriptedSource::new(vec![], claims(&[true, true]))).await;
    h.start().await;
    let before = h.controller.generation();
    h.controller
        .handle(SessionEvent::ResultTimerElapsed { generation: before })
        .await
        .unwrap();
    assert_eq!(h.controller.phase(), SessionPhase::AwaitingAnswer);
    assert_eq!(h.controller.state().question_index(), 0);
}

#[tokio::test]
async fn storage_failure_is_fatal_and_not_retryable() {
    let repo = CountingRepository {
        fail: true,
        ..CountingRepository::default()
    };
    let mut h = Harness::with_repo(ScriptedSource::new(vec![], claims(&[true; 10])), repo).await;
    h.start().await;
    for _ in 0..9 {
        h.answer(true).await.unwrap();
    }
    let err = h.answer(true).await.unwrap_err();

    assert!(matches!(err, SessionError::Statistics(_)));
    assert_eq!(h.display.count(|c| matches!(c, Call::Fatal(_))), 1);
    assert_eq!(h.display.count(|c| matches!(c, Call::Retry(_))), 0);
    assert_eq!(h.display.count(|c| matches!(c, Call::Summary(_))), 0);
}

#[tokio::test]
async fn run_loop_plays_until_shutdown() {
    let source = Arc::new(ScriptedSource::new(vec![], claims(&[false; 10])));
    let display = Arc::new(RecordingDisplay::default());
    let statistics = Arc::new(
        StatisticsStore::load(Clock::fixed(fixed_now()), Arc::new(InMemoryRepository::new()))
            .await
            .unwrap(),
    );
    let (controller, events) = SessionController::new(source, statistics.clone(), display.clone());
    let controller = controller.with_result_delay(Duration::from_millis(1));
    let handle = controller.session_handle();
    let task = tokio::spawn(controller.run(events));

    handle.start();
    for _ in 0..10 {
        loop {
            tokio::time::sleep(Duration::from_millis(2)).await;
            let questions = display.count(|c| matches!(c, Call::Question(_)));
            let highlights = display.count(|c| matches!(c, Call::Highlight(_)));
            if questions > highlights {
                break;
            }
        }
        handle.answer(false);
    }
    while display.summary.lock().unwrap().is_none() {
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    handle.shutdown();
    task.await.unwrap().unwrap();

    assert_eq!(statistics.snapshot().games_count, 1);
    assert_eq!(
        statistics.snapshot().best_game.map(|g| g.correct()),
        Some(10)
    );
}

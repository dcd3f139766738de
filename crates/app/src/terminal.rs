use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use services::{QuizDisplay, QuizResultsView, QuizStepView, Responder, RetryPrompt, SessionHandle};

/// Line-oriented display: prints quiz steps to stdout and turns typed lines
/// back into session events.
#[derive(Default)]
pub struct TerminalDisplay {
    prompt: Mutex<Option<Responder>>,
    input_locked: Mutex<bool>,
}

/// What a typed line means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Answer(bool),
    Confirm,
    Quit,
    Unknown,
}

impl InputAction {
    #[must_use]
    pub fn parse(line: &str) -> Self {
        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Self::Answer(true),
            "n" | "no" => Self::Answer(false),
            "" => Self::Confirm,
            "q" | "quit" => Self::Quit,
            _ => Self::Unknown,
        }
    }
}

impl TerminalDisplay {
    /// Routes one typed line. Returns `false` when the user asked to quit.
    pub fn dispatch(&self, line: &str, session: &SessionHandle) -> bool {
        match InputAction::parse(line) {
            InputAction::Quit => return false,
            InputAction::Confirm => {
                let pending = self
                    .prompt
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .take();
                if let Some(responder) = pending {
                    responder.respond();
                }
            }
            InputAction::Answer(yes) => {
                if *self.input_locked.lock().unwrap_or_else(PoisonError::into_inner) {
                    print_line("(wait for the next question)");
                } else {
                    session.answer(yes);
                }
            }
            InputAction::Unknown => print_line("Type y or n to answer, q to quit."),
        }
        true
    }

    fn set_locked(&self, locked: bool) {
        *self.input_locked.lock().unwrap_or_else(PoisonError::into_inner) = locked;
    }

    fn hold_prompt(&self, responder: Responder) {
        *self.prompt.lock().unwrap_or_else(PoisonError::into_inner) = Some(responder);
    }
}

fn print_line(text: &str) {
    let mut out = io::stdout().lock();
    // Nothing sensible to do if the terminal is gone.
    let _ = writeln!(out, "{text}");
    let _ = out.flush();
}

impl QuizDisplay for TerminalDisplay {
    fn show_question(&self, step: &QuizStepView) {
        print_line(&format!(
            "\n[{}] poster: {} bytes\n{} (y/n)",
            step.question_number,
            step.image.len(),
            step.question
        ));
    }

    fn lock_input(&self) {
        self.set_locked(true);
    }

    fn unlock_input(&self) {
        self.set_locked(false);
    }

    fn show_answer_highlight(&self, is_correct: bool) {
        print_line(if is_correct { "Correct!" } else { "Wrong." });
    }

    fn show_loading_indicator(&self) {
        print_line("Loading...");
    }

    fn show_summary(&self, results: &QuizResultsView, on_acknowledge: Responder) {
        print_line(&format!(
            "\n{}\n{}\n[Enter] {}",
            results.title, results.message, results.button_text
        ));
        self.hold_prompt(on_acknowledge);
    }

    fn show_retry_prompt(&self, prompt: &RetryPrompt, on_retry: Responder) {
        print_line(&format!(
            "\n{}\n{}\n[Enter] {}",
            prompt.title, prompt.message, prompt.button_text
        ));
        self.hold_prompt(on_retry);
    }

    fn show_fatal_error(&self, message: &str) {
        print_line(&format!("\nCannot continue: {message}"));
    }
}

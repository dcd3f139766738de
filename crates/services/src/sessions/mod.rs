//! The quiz round state machine and its display boundary.

mod controller;
mod display;
mod events;
mod state;
mod summary;
mod tasks;

pub use controller::SessionController;
pub use display::{QuizDisplay, QuizResultsView, QuizStepView, RetryPrompt};
pub use events::{Responder, SessionEvent, SessionHandle};
pub use state::{PendingStep, SessionPhase, SessionState};
pub use summary::results_view;

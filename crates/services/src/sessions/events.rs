use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use quiz_core::model::Question;

use crate::error::NetworkError;

/// Everything the controller reacts to. Completions of asynchronous work carry
/// the generation they were issued under; anything older than the controller's
/// current generation is dropped.
#[derive(Debug)]
pub enum SessionEvent {
    Start,
    CatalogLoaded {
        generation: u64,
        result: Result<(), NetworkError>,
    },
    QuestionReceived {
        generation: u64,
        result: Result<Question, NetworkError>,
    },
    Answer(bool),
    ResultTimerElapsed {
        generation: u64,
    },
    RetryConfirmed {
        generation: u64,
    },
    SummaryAcknowledged {
        generation: u64,
    },
    Shutdown,
}

/// Cloneable entry point the display uses to talk to the controller.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    events: UnboundedSender<SessionEvent>,
}

impl SessionHandle {
    #[must_use]
    pub fn new(events: UnboundedSender<SessionEvent>) -> Self {
        Self { events }
    }

    pub fn start(&self) {
        self.send(SessionEvent::Start);
    }

    /// Submit a yes (`true`) or no (`false`) answer.
    pub fn answer(&self, yes: bool) {
        self.send(SessionEvent::Answer(yes));
    }

    pub fn shutdown(&self) {
        self.send(SessionEvent::Shutdown);
    }

    fn send(&self, event: SessionEvent) {
        if let Err(err) = self.events.send(event) {
            debug!(event = ?err.0, "session controller is gone");
        }
    }
}

/// One-shot callback handed to the display with a prompt.
///
/// Bound to the generation the prompt was shown under, so responding to a
/// prompt that has since been superseded is a no-op.
#[derive(Debug)]
pub struct Responder {
    events: UnboundedSender<SessionEvent>,
    event: SessionEvent,
}

impl Responder {
    pub(crate) fn new(events: UnboundedSender<SessionEvent>, event: SessionEvent) -> Self {
        Self { events, event }
    }

    pub fn respond(self) {
        if let Err(err) = self.events.send(self.event) {
            debug!(event = ?err.0, "session controller is gone");
        }
    }
}

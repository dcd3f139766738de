use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use super::events::SessionEvent;
use super::state::PendingStep;

/// Spawned task that is aborted when the handle is dropped.
#[derive(Debug)]
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// The single outstanding source request.
#[derive(Debug)]
pub(crate) struct InFlightRequest {
    step: PendingStep,
    generation: u64,
    _task: AbortOnDrop,
}

impl InFlightRequest {
    pub(crate) fn spawn<F>(step: PendingStep, generation: u64, work: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            step,
            generation,
            _task: AbortOnDrop(tokio::spawn(work)),
        }
    }

    pub(crate) fn step(&self) -> PendingStep {
        self.step
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

/// Pending "advance after showing the result" timer.
#[derive(Debug)]
pub(crate) struct ResultTimer {
    generation: u64,
    _task: AbortOnDrop,
}

impl ResultTimer {
    pub(crate) fn schedule(
        delay: Duration,
        generation: u64,
        events: UnboundedSender<SessionEvent>,
    ) -> Self {
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the session shut down.
            let _ = events.send(SessionEvent::ResultTimerElapsed { generation });
        });
        Self {
            generation,
            _task: AbortOnDrop(task),
        }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

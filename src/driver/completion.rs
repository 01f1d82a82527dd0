//! One-shot completion notification for an exploration.

use std::fmt;

use crossbeam_channel::{bounded, Receiver};
use serde::{Deserialize, Serialize};

/// How an exploration finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The encounter reached a terminal state.
    Ended,
    /// Exploration stopped first (depth budget spent, or the engine stalled).
    Unfinished,
}

impl Outcome {
    /// Whether the encounter itself ended.
    #[must_use]
    pub fn is_ended(self) -> bool {
        self == Outcome::Ended
    }
}

type Callback = Box<dyn FnOnce(Outcome) + Send>;

/// Fires registered callbacks exactly once.
///
/// Callbacks registered after completion run immediately with the stored
/// outcome.
#[derive(Default)]
pub struct CompletionSignal {
    outcome: Option<Outcome>,
    waiters: Vec<Callback>,
}

impl CompletionSignal {
    /// Create a pending signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The outcome, once complete.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Whether the signal has fired.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.outcome.is_some()
    }

    /// Register a callback for the outcome.
    pub fn register(&mut self, callback: impl FnOnce(Outcome) + Send + 'static) {
        match self.outcome {
            Some(outcome) => callback(outcome),
            None => self.waiters.push(Box::new(callback)),
        }
    }

    /// A channel that receives the outcome once.
    pub fn wait(&mut self) -> Receiver<Outcome> {
        let (tx, rx) = bounded(1);
        self.register(move |outcome| {
            // the waiter may have dropped its receiver
            let _ = tx.send(outcome);
        });
        rx
    }

    /// Fire the signal. Returns `false` if it had already fired.
    pub fn complete(&mut self, outcome: Outcome) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        self.outcome = Some(outcome);
        for waiter in self.waiters.drain(..) {
            waiter(outcome);
        }
        true
    }
}

impl fmt::Debug for CompletionSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionSignal")
            .field("outcome", &self.outcome)
            .field("waiters", &self.waiters.len())
            .finish()
    }
}

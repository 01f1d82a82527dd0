//! Error types for exploration.
//!
//! Errors are strongly typed with `thiserror` so callers can tell a
//! recoverable engine rejection apart from a broken replay.

use thiserror::Error;

use super::side::SideId;
use crate::record::RollDomain;

/// Failures raised by the replay oracle while serving a draw.
///
/// Both variants are fatal for the exploration that hit them.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RollError {
    /// The recorded roll at this position has a different domain than the
    /// engine asked for. Either the engine is nondeterministic or the seed
    /// path does not belong to this engine state.
    #[error("roll {index} did not match: recorded {recorded}, requested {requested}")]
    Mismatch {
        index: usize,
        recorded: RollDomain,
        requested: RollDomain,
    },

    /// A draw past the end of the recording while new rolls are disabled.
    #[error("unknown roll {index} requested ({requested}), cannot generate new rolls")]
    UnknownRoll { index: usize, requested: RollDomain },
}

/// Errors reported by a rule engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The command is well formed but not legal right now.
    #[error("[Unavailable choice] {side} {reason}")]
    UnavailableChoice { side: SideId, reason: String },

    /// The command could not be understood.
    #[error("[Invalid choice] {side} {reason}")]
    InvalidChoice { side: SideId, reason: String },

    #[error(transparent)]
    Roll(#[from] RollError),

    #[error("snapshot codec failed: {0}")]
    Snapshot(#[from] bincode::Error),
}

impl EngineError {
    /// Whether the driver may ignore this error and keep exploring.
    #[must_use]
    pub fn is_unavailable_choice(&self) -> bool {
        matches!(self, EngineError::UnavailableChoice { .. })
    }
}

/// Errors that abort a single exploration or run.
#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A replayed round does not line up with what the engine requests.
    #[error("round {round}: {side} has {recorded} recorded slots but the engine requested {requested}")]
    ChoiceMismatch {
        round: usize,
        side: SideId,
        recorded: usize,
        requested: usize,
    },

    /// A replayed path produced different narration than its recording.
    #[error("replay diverged at narration line {line}: expected {expected:?}, got {actual:?}")]
    NarrationDiverged {
        line: usize,
        expected: Option<String>,
        actual: Option<String>,
    },
}

impl ExplorerError {
    /// The underlying roll failure, if this error came from the oracle.
    #[must_use]
    pub fn as_roll_error(&self) -> Option<&RollError> {
        match self {
            ExplorerError::Engine(EngineError::Roll(err)) => Some(err),
            _ => None,
        }
    }
}

/// Errors from the job pool.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The worker thread for a job could not be started.
    #[error("failed to spawn exploration worker: {0}")]
    Spawn(#[from] std::io::Error),
}

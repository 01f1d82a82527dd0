//! Rule engine protocol.
//!
//! Engines implement `BattleEngine` to be explored:
//! - Emit per-side requests (preview, wait, or act with legal options)
//! - Accept string commands per side
//! - Resolve a round once every side has chosen, drawing randomness only
//!   from the source lent to `choose`
//! - Narrate what happened and report when the encounter is over
//!
//! The explorer never interprets game concepts beyond the request shape.

use serde::{Deserialize, Serialize};

use crate::core::{EngineError, RandomSource, SideId};

/// Serialized engine state an exploration is forked from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Snapshot(pub Vec<u8>);

impl Snapshot {
    /// Encode a serializable state.
    pub fn encode<T: Serialize>(state: &T) -> Result<Self, EngineError> {
        Ok(Snapshot(bincode::serialize(state)?))
    }

    /// Decode a state previously encoded with [`Snapshot::encode`].
    pub fn decode<T: for<'de> Deserialize<'de>>(&self) -> Result<T, EngineError> {
        Ok(bincode::deserialize(&self.0)?)
    }

    /// Encoded size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the snapshot holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Options for one unit that can act this round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSlot {
    /// Move names in command order (`move 1` is the first).
    pub moves: Vec<String>,
    /// Whether the unit could switch out instead.
    pub can_switch: bool,
}

/// What the engine wants from one side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SideRequest {
    /// Pre-battle team preview.
    Preview,
    /// Nothing to choose; the side waits for the others.
    Wait,
    /// Choose one action per active unit.
    Act { active: Vec<ActiveSlot> },
    /// Replace the fainted units marked `true`.
    ForceSwitch { slots: Vec<bool> },
}

impl SideRequest {
    /// Number of units that choose an action, for `Act` requests.
    #[must_use]
    pub fn actable_units(&self) -> Option<usize> {
        match self {
            SideRequest::Act { active } => Some(active.len()),
            _ => None,
        }
    }
}

/// A turn-based rule engine driven by side requests and string commands.
pub trait BattleEngine {
    /// Number of sides in the encounter.
    fn side_count(&self) -> usize;

    /// Requests emitted since the last call.
    ///
    /// A freshly restored engine re-emits its outstanding requests.
    fn take_requests(&mut self) -> Vec<(SideId, SideRequest)>;

    /// Whether `side` has nothing left to submit this round.
    fn is_choice_done(&self, side: SideId) -> bool;

    /// Submit a command for `side`.
    ///
    /// If this completes the round, the engine resolves it, drawing every
    /// random value from `rng`. The source is only borrowed for this call.
    fn choose(
        &mut self,
        side: SideId,
        command: &str,
        rng: &mut dyn RandomSource,
    ) -> Result<(), EngineError>;

    /// Whether the encounter reached a terminal state.
    fn ended(&self) -> bool;

    /// Narration lines produced since the last call.
    fn drain_narration(&mut self) -> Vec<String>;

    /// Serialize the current state.
    fn snapshot(&self) -> Result<Snapshot, EngineError>;

    /// Rebuild an engine from a snapshot.
    fn restore(snapshot: &Snapshot) -> Result<Self, EngineError>
    where
        Self: Sized;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_round_trip() {
        let state = (3u8, vec!["p1".to_string(), "p2".to_string()]);
        let snapshot = Snapshot::encode(&state).unwrap();
        assert!(!snapshot.is_empty());

        let decoded: (u8, Vec<String>) = snapshot.decode().unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn test_snapshot_decode_garbage_fails() {
        let snapshot = Snapshot(vec![0xff]);
        let decoded: Result<Vec<String>, _> = snapshot.decode();
        assert!(matches!(decoded, Err(EngineError::Snapshot(_))));
    }

    #[test]
    fn test_actable_units() {
        let act = SideRequest::Act {
            active: vec![
                ActiveSlot {
                    moves: vec!["Tackle".to_string()],
                    can_switch: false,
                };
                2
            ],
        };
        assert_eq!(act.actable_units(), Some(2));
        assert_eq!(SideRequest::Wait.actable_units(), None);
        assert_eq!(SideRequest::ForceSwitch { slots: vec![true] }.actable_units(), None);
    }
}

//! Replaying random source.
//!
//! The oracle wraps one round's recorded rolls. Draws inside the recording
//! are replayed verbatim after checking their domain; draws past it are
//! fabricated at the minimum of their domain and appended, so the first
//! outcome explored for any round is always the all-minimum one.

use std::ops::Range;

use tracing::trace;

use crate::core::{RandomSource, RollError, SwapOffsets};
use crate::record::{Roll, RollDomain};

/// Random source that replays and extends a list of rolls.
#[derive(Clone, Debug)]
pub struct ReplayOracle {
    rolls: Vec<Roll>,
    cursor: usize,
    allow_new_rolls: bool,
}

impl ReplayOracle {
    /// Create an oracle replaying `rolls`, fabricating new ones past the end.
    #[must_use]
    pub fn new(rolls: Vec<Roll>) -> Self {
        Self {
            rolls,
            cursor: 0,
            allow_new_rolls: true,
        }
    }

    /// Allow or forbid fabricating rolls past the recording.
    #[must_use]
    pub fn with_new_rolls(mut self, allow: bool) -> Self {
        self.allow_new_rolls = allow;
        self
    }

    /// Recorded rolls, including any fabricated so far.
    #[must_use]
    pub fn rolls(&self) -> &[Roll] {
        &self.rolls
    }

    /// Consume the oracle, returning its rolls.
    #[must_use]
    pub fn into_rolls(self) -> Vec<Roll> {
        self.rolls
    }

    /// Number of non-trivial draws served so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Whether recorded rolls remain to be replayed.
    #[must_use]
    pub fn is_replaying(&self) -> bool {
        self.cursor < self.rolls.len()
    }

    fn draw(&mut self, requested: &RollDomain) -> Result<Roll, RollError> {
        let index = self.cursor;
        self.cursor += 1;

        if index < self.rolls.len() {
            let recorded = &self.rolls[index];
            if !recorded.is_compatible(requested) {
                return Err(RollError::Mismatch {
                    index,
                    recorded: recorded.domain(),
                    requested: requested.clone(),
                });
            }
            trace!(index, roll = %recorded, "replayed roll");
            return Ok(recorded.clone());
        }

        if !self.allow_new_rolls {
            return Err(RollError::UnknownRoll {
                index,
                requested: requested.clone(),
            });
        }

        let roll = requested.first();
        trace!(index, domain = %requested, "recorded new roll");
        self.rolls.push(roll.clone());
        Ok(roll)
    }

    fn mismatch(&self, roll: &Roll, requested: RollDomain) -> RollError {
        RollError::Mismatch {
            index: self.cursor.saturating_sub(1),
            recorded: roll.domain(),
            requested,
        }
    }
}

impl RandomSource for ReplayOracle {
    fn range(&mut self, range: Range<i32>) -> Result<i32, RollError> {
        let requested = RollDomain::Range {
            min: range.start,
            max: range.end.saturating_sub(1),
        };
        if requested.is_trivial() {
            return Ok(range.start);
        }

        match self.draw(&requested)? {
            Roll::Range { value, .. } => Ok(value),
            other => Err(self.mismatch(&other, requested)),
        }
    }

    fn chance(&mut self, numerator: u32, denominator: u32) -> Result<bool, RollError> {
        let requested = RollDomain::Chance {
            numerator,
            denominator,
        };
        if requested.is_trivial() {
            return Ok(numerator != 0);
        }

        match self.draw(&requested)? {
            Roll::Chance { value, .. } => Ok(value),
            other => Err(self.mismatch(&other, requested)),
        }
    }

    fn swap_offsets(&mut self, len: usize) -> Result<SwapOffsets, RollError> {
        let requested = RollDomain::Shuffle { items: len };
        if requested.is_trivial() {
            return Ok(SwapOffsets::new());
        }

        match self.draw(&requested)? {
            Roll::Shuffle { offsets } => Ok(offsets),
            other => Err(self.mismatch(&other, requested)),
        }
    }
}

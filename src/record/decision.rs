//! Choice slots and decisions (one round of a path).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::roll::Roll;
use crate::core::SideId;

/// One independently choosable unit's options and the selected index.
///
/// Options are only meaningful for the round that produced them; the
/// enumerator only ever moves the cursor.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChoiceSlot {
    /// Commands the engine would accept for this unit.
    pub choices: Vec<String>,
    /// Index of the selected command.
    pub index: usize,
}

impl ChoiceSlot {
    /// Create a slot selecting the first option.
    #[must_use]
    pub fn new(choices: Vec<String>) -> Self {
        Self { choices, index: 0 }
    }

    /// Create a slot with an explicit cursor.
    #[must_use]
    pub fn with_index(choices: Vec<String>, index: usize) -> Self {
        Self { choices, index }
    }

    /// The selected command, or `None` if the cursor is out of range.
    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.choices.get(self.index).map(String::as_str)
    }

    /// The slot with the cursor advanced, or `None` when exhausted.
    #[must_use]
    pub fn next_permutation(&self) -> Option<ChoiceSlot> {
        let index = self.index + 1;
        (index < self.choices.len()).then(|| ChoiceSlot {
            choices: self.choices.clone(),
            index,
        })
    }

    /// Move the cursor back to the first option.
    pub fn reset(&mut self) {
        self.index = 0;
    }
}

impl fmt::Display for ChoiceSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index)
    }
}

/// One round: every side's choice slots plus the rolls consumed while
/// the engine resolved it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Decision {
    /// Choice slots per side, indexed by `SideId`. A side that only had to
    /// wait this round has no slots.
    pub choices: Vec<Vec<ChoiceSlot>>,
    /// Rolls in consumption order.
    pub rolls: Vec<Roll>,
}

impl Decision {
    /// Create an empty decision.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decision from per-side slots and rolls.
    #[must_use]
    pub fn with_parts(choices: Vec<Vec<ChoiceSlot>>, rolls: Vec<Roll>) -> Self {
        Self { choices, rolls }
    }

    /// Slots recorded for `side` (empty if none).
    #[must_use]
    pub fn side(&self, side: SideId) -> &[ChoiceSlot] {
        self.choices
            .get(side.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Replace the slots recorded for `side`.
    pub fn set_side(&mut self, side: SideId, slots: Vec<ChoiceSlot>) {
        if self.choices.len() <= side.index() {
            self.choices.resize_with(side.index() + 1, Vec::new);
        }
        self.choices[side.index()] = slots;
    }

    /// Product of the probabilities of this round's rolls.
    #[must_use]
    pub fn probability(&self) -> f64 {
        self.rolls.iter().map(Roll::probability).product()
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (side, slots) in self.choices.iter().enumerate() {
            if side > 0 {
                f.write_str(";")?;
            }
            f.write_str("[")?;
            for (i, slot) in slots.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{slot}")?;
            }
            f.write_str("]")?;
        }
        f.write_str(")<")?;
        for (i, roll) in self.rolls.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{roll}")?;
        }
        f.write_str(">")
    }
}

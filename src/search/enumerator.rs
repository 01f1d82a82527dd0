//! Next-path computation.
//!
//! A path is read as a mixed-radix number. Earlier decisions are more
//! significant than later ones; within a decision, choice cursors are more
//! significant than rolls. Incrementing always tries the last roll of the
//! last decision first, since rolls are discovered lazily during play and
//! anything after the incremented digit is unknown until replayed.
//!
//! ```
//! use encounter_explorer::record::{ChoiceSlot, Decision, Path};
//! use encounter_explorer::search::Enumerator;
//!
//! let options = vec!["move 1".to_string(), "move 2".to_string()];
//! let path = Path::from(vec![Decision::with_parts(
//!     vec![vec![ChoiceSlot::new(options.clone())], vec![ChoiceSlot::new(options)]],
//!     Vec::new(),
//! )]);
//!
//! let next = Enumerator::default().next(&path).unwrap();
//! assert_eq!(next.to_string(), "([0];[1])<>");
//! ```

use tracing::trace;

use crate::core::ExplorerConfig;
use crate::record::{Decision, Path, Roll};

/// Bounds of the fixed-width damage variance draw.
const DAMAGE_ROLL_MIN: i32 = 0;
const DAMAGE_ROLL_MAX: i32 = 15;
/// Representative damage roll between the minimum and maximum.
const DAMAGE_ROLL_MID: i32 = 7;

/// Computes the next unexplored path from an explored one.
#[derive(Clone, Debug)]
pub struct Enumerator {
    collapse_damage_rolls: bool,
}

impl Default for Enumerator {
    fn default() -> Self {
        Self {
            collapse_damage_rolls: true,
        }
    }
}

impl Enumerator {
    /// Create an enumerator with the default damage collapse.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an enumerator following an exploration config.
    pub fn from_config(config: &ExplorerConfig) -> Self {
        Self {
            collapse_damage_rolls: config.collapse_damage_rolls,
        }
    }

    /// Enable or disable the `[0, 15]` damage roll collapse.
    pub fn with_damage_collapse(mut self, collapse: bool) -> Self {
        self.collapse_damage_rolls = collapse;
        self
    }

    /// The next path after `path`, or `None` once the tree is exhausted.
    ///
    /// The result keeps every decision before the incremented one
    /// unchanged and drops every decision after it.
    #[must_use]
    pub fn next(&self, path: &Path) -> Option<Path> {
        for (index, decision) in path.iter().enumerate().rev() {
            let next = self
                .next_in_rolls(decision)
                .or_else(|| Self::next_in_choices(decision));

            if let Some(next) = next {
                trace!(round = index, decision = %next, "incremented decision");
                let mut result = path.prefix(index);
                result.push(next);
                return Some(result);
            }
        }
        None
    }

    /// The next value of a single roll under this enumerator's rules.
    #[must_use]
    pub fn next_roll(&self, roll: &Roll) -> Option<Roll> {
        match *roll {
            Roll::Range {
                value,
                min: DAMAGE_ROLL_MIN,
                max: DAMAGE_ROLL_MAX,
            } if self.collapse_damage_rolls => {
                let value = if value < DAMAGE_ROLL_MID {
                    DAMAGE_ROLL_MID
                } else if value < DAMAGE_ROLL_MAX {
                    DAMAGE_ROLL_MAX
                } else {
                    return None;
                };
                Some(Roll::Range {
                    value,
                    min: DAMAGE_ROLL_MIN,
                    max: DAMAGE_ROLL_MAX,
                })
            }
            _ => roll.next_permutation(),
        }
    }

    /// Increment the last roll that admits a next value, dropping the
    /// rolls after it.
    fn next_in_rolls(&self, decision: &Decision) -> Option<Decision> {
        decision
            .rolls
            .iter()
            .enumerate()
            .rev()
            .find_map(|(index, roll)| {
                let next = self.next_roll(roll)?;
                let mut rolls = decision.rolls[..index].to_vec();
                rolls.push(next);
                Some(Decision::with_parts(decision.choices.clone(), rolls))
            })
    }

    /// Increment the last choice slot that admits a next cursor, resetting
    /// every later slot and clearing the rolls.
    ///
    /// Later slots are reset to cursor 0 even when the new choice (a
    /// switch, say) changes what is legal for them.
    fn next_in_choices(decision: &Decision) -> Option<Decision> {
        for side in (0..decision.choices.len()).rev() {
            for slot in (0..decision.choices[side].len()).rev() {
                let Some(next) = decision.choices[side][slot].next_permutation() else {
                    continue;
                };

                let mut choices = decision.choices.clone();
                choices[side][slot] = next;
                for later in &mut choices[side][slot + 1..] {
                    later.reset();
                }
                for later_side in &mut choices[side + 1..] {
                    later_side.iter_mut().for_each(|later| later.reset());
                }
                return Some(Decision::with_parts(choices, Vec::new()));
            }
        }
        None
    }
}

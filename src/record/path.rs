//! Explored paths.
//!
//! A [`Path`] is the ordered list of decisions of one playthrough, or a
//! prefix of one. Paths handed out are never mutated; new paths are built
//! by structural copy, which `im::Vector` makes cheap by sharing the
//! untouched decisions.

use std::fmt;

use im::Vector;
use serde::{Deserialize, Serialize};

use super::decision::Decision;

/// Ordered decisions from the start of the encounter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    decisions: Vector<Decision>,
}

impl Path {
    /// Create an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of decisions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    /// Whether the path has no decisions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// Decision at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Decision> {
        self.decisions.get(index)
    }

    /// Mutable decision at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Decision> {
        self.decisions.get_mut(index)
    }

    /// Append a decision.
    pub fn push(&mut self, decision: Decision) {
        self.decisions.push_back(decision);
    }

    /// Iterate over decisions in order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Decision> + ExactSizeIterator {
        self.decisions.iter()
    }

    /// A copy holding only the first `len` decisions.
    #[must_use]
    pub fn prefix(&self, len: usize) -> Path {
        Path {
            decisions: self.decisions.take(len.min(self.decisions.len())),
        }
    }

    /// Total number of recorded rolls.
    #[must_use]
    pub fn roll_count(&self) -> usize {
        self.decisions.iter().map(|d| d.rolls.len()).sum()
    }

    /// Probability of this path's random outcomes, given its choices.
    #[must_use]
    pub fn probability(&self) -> f64 {
        self.decisions.iter().map(Decision::probability).product()
    }
}

impl From<Vec<Decision>> for Path {
    fn from(decisions: Vec<Decision>) -> Self {
        decisions.into_iter().collect()
    }
}

impl FromIterator<Decision> for Path {
    fn from_iter<I: IntoIterator<Item = Decision>>(iter: I) -> Self {
        Path {
            decisions: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, decision) in self.decisions.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{decision}")?;
        }
        Ok(())
    }
}

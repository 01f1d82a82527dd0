//! Recorded random draws.
//!
//! A [`Roll`] is one draw the engine made: its domain plus the value that
//! was realized. Each roll knows the next value in its domain, which is
//! what lets a path be counted through like a mixed-radix number.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::smallvec;

use crate::core::SwapOffsets;

/// The domain a draw was requested from.
///
/// Two draws are compatible only if their domains are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RollDomain {
    /// Integer in `[min, max]` (both inclusive).
    Range { min: i32, max: i32 },
    /// Bernoulli draw with probability `numerator / denominator`.
    Chance { numerator: u32, denominator: u32 },
    /// Permutation of `items` items.
    Shuffle { items: usize },
}

impl RollDomain {
    /// Whether the domain has a single possible outcome.
    ///
    /// Trivial draws are answered without being recorded.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        match *self {
            RollDomain::Range { min, max } => min >= max,
            RollDomain::Chance {
                numerator,
                denominator,
            } => numerator == 0 || numerator >= denominator,
            RollDomain::Shuffle { items } => items < 2,
        }
    }

    /// The canonical first outcome: lowest value, `false`, or identity order.
    #[must_use]
    pub fn first(&self) -> Roll {
        match *self {
            RollDomain::Range { min, max } => Roll::Range {
                value: min,
                min,
                max,
            },
            RollDomain::Chance {
                numerator,
                denominator,
            } => Roll::Chance {
                value: false,
                numerator,
                denominator,
            },
            RollDomain::Shuffle { items } => Roll::Shuffle {
                offsets: smallvec![0; items.saturating_sub(1)],
            },
        }
    }
}

impl fmt::Display for RollDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RollDomain::Range { min, max } => write!(f, "range [{min}, {max}]"),
            RollDomain::Chance {
                numerator,
                denominator,
            } => write!(f, "chance {numerator}/{denominator}"),
            RollDomain::Shuffle { items } => write!(f, "shuffle of {items}"),
        }
    }
}

/// One recorded random draw.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Roll {
    /// Integer draw with its inclusive bounds.
    Range { value: i32, min: i32, max: i32 },
    /// Coin flip. `false` is enumerated before `true`.
    Chance {
        value: bool,
        numerator: u32,
        denominator: u32,
    },
    /// Permutation encoded as swap offsets (one per item but the last).
    Shuffle { offsets: SwapOffsets },
}

impl Roll {
    /// The domain this roll was drawn from.
    #[must_use]
    pub fn domain(&self) -> RollDomain {
        match *self {
            Roll::Range { min, max, .. } => RollDomain::Range { min, max },
            Roll::Chance {
                numerator,
                denominator,
                ..
            } => RollDomain::Chance {
                numerator,
                denominator,
            },
            Roll::Shuffle { ref offsets } => RollDomain::Shuffle {
                items: offsets.len() + 1,
            },
        }
    }

    /// Whether this roll can stand in for a draw from `requested`.
    #[must_use]
    pub fn is_compatible(&self, requested: &RollDomain) -> bool {
        self.domain() == *requested
    }

    /// The next value in this roll's domain, or `None` when exhausted.
    ///
    /// Shuffles count from the last offset with carry. The leading offset
    /// is never advanced: a carry into it exhausts the domain.
    #[must_use]
    pub fn next_permutation(&self) -> Option<Roll> {
        match *self {
            Roll::Range { value, min, max } => (value < max).then(|| Roll::Range {
                value: value + 1,
                min,
                max,
            }),
            Roll::Chance {
                value,
                numerator,
                denominator,
            } => (!value).then_some(Roll::Chance {
                value: true,
                numerator,
                denominator,
            }),
            Roll::Shuffle { ref offsets } => {
                let len = offsets.len();
                let mut next = offsets.clone();
                let mut digit = len.checked_sub(1)?;
                while digit > 0 {
                    next[digit] += 1;
                    if next[digit] <= len - digit {
                        return Some(Roll::Shuffle { offsets: next });
                    }
                    next[digit] = 0;
                    digit -= 1;
                }
                None
            }
        }
    }

    /// Probability of this particular outcome within its domain.
    #[must_use]
    pub fn probability(&self) -> f64 {
        match *self {
            Roll::Range { min, max, .. } => 1.0 / (f64::from(max) - f64::from(min) + 1.0),
            Roll::Chance {
                value,
                numerator,
                denominator,
            } => {
                let hits = if value {
                    numerator
                } else {
                    denominator.saturating_sub(numerator)
                };
                f64::from(hits) / f64::from(denominator)
            }
            Roll::Shuffle { ref offsets } => {
                let permutations: f64 = (1..=offsets.len() + 1).map(|n| n as f64).product();
                1.0 / permutations
            }
        }
    }
}

impl fmt::Display for Roll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Roll::Range { value, .. } => write!(f, "{value}"),
            Roll::Chance { value, .. } => f.write_str(if *value { "1" } else { "0" }),
            Roll::Shuffle { offsets } => {
                f.write_str("[")?;
                for (i, offset) in offsets.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{offset}")?;
                }
                f.write_str("]")
            }
        }
    }
}

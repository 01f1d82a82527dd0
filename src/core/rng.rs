//! Random sources consumed by rule engines.
//!
//! Engines never own their randomness. Every draw goes through a
//! [`RandomSource`] lent to them for the duration of one command, so the
//! explorer can substitute a replaying oracle for live randomness.
//!
//! ## Draw kinds
//!
//! - **Range**: an integer from a half-open range
//! - **Chance**: a Bernoulli draw `numerator / denominator`
//! - **Shuffle**: a permutation, encoded as Fisher-Yates swap offsets
//!
//! ```
//! use encounter_explorer::core::{shuffle, RandomSource, SeededRandom};
//!
//! let mut rng = SeededRandom::new(42);
//! let damage = rng.range(0..16).unwrap();
//! assert!((0..16).contains(&damage));
//!
//! let mut order = vec!['a', 'b', 'c'];
//! shuffle(&mut rng, &mut order).unwrap();
//! order.sort();
//! assert_eq!(order, vec!['a', 'b', 'c']);
//! ```

use std::ops::Range;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use smallvec::SmallVec;

use super::error::RollError;

/// Swap offsets describing one permutation.
///
/// Entry `i` swaps item `i` with item `i + offset`. A permutation of `n`
/// items has `n - 1` entries.
pub type SwapOffsets = SmallVec<[usize; 4]>;

/// Source of every random decision a rule engine makes.
pub trait RandomSource {
    /// Draw an integer from `range` (end exclusive).
    fn range(&mut self, range: Range<i32>) -> Result<i32, RollError>;

    /// Return `true` with probability `numerator / denominator`.
    fn chance(&mut self, numerator: u32, denominator: u32) -> Result<bool, RollError>;

    /// Draw a permutation of `len` items as swap offsets.
    fn swap_offsets(&mut self, len: usize) -> Result<SwapOffsets, RollError>;
}

/// Shuffle `items` in place using one permutation draw.
pub fn shuffle<T, R>(rng: &mut R, items: &mut [T]) -> Result<(), RollError>
where
    R: RandomSource + ?Sized,
{
    let offsets = rng.swap_offsets(items.len())?;
    for (i, &offset) in offsets.iter().enumerate() {
        if offset != 0 {
            items.swap(i, i + offset);
        }
    }
    Ok(())
}

/// Live randomness backed by ChaCha8.
///
/// Used to play an encounter normally, outside exploration. Same seed,
/// same sequence of draws.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    inner: ChaCha8Rng,
    seed: u64,
    fork_counter: u64,
}

impl SeededRandom {
    /// Create a new source with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
            fork_counter: 0,
        }
    }

    /// The seed this source was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fork an independent, deterministic stream.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        self.fork_counter += 1;
        let fork_seed = self
            .seed
            .wrapping_add(self.fork_counter.wrapping_mul(0x9E3779B97F4A7C15));
        Self::new(fork_seed)
    }
}

impl RandomSource for SeededRandom {
    fn range(&mut self, range: Range<i32>) -> Result<i32, RollError> {
        if range.end <= range.start.saturating_add(1) {
            return Ok(range.start);
        }
        Ok(self.inner.gen_range(range))
    }

    fn chance(&mut self, numerator: u32, denominator: u32) -> Result<bool, RollError> {
        if numerator == 0 {
            return Ok(false);
        }
        if numerator >= denominator {
            return Ok(true);
        }
        Ok(self.inner.gen_ratio(numerator, denominator))
    }

    fn swap_offsets(&mut self, len: usize) -> Result<SwapOffsets, RollError> {
        Ok((0..len.saturating_sub(1))
            .map(|i| self.inner.gen_range(0..len - i))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = SeededRandom::new(42);
        let mut rng2 = SeededRandom::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.range(0..1000).unwrap(), rng2.range(0..1000).unwrap());
        }
    }

    #[test]
    fn test_fork_is_deterministic() {
        let mut rng1 = SeededRandom::new(7);
        let mut rng2 = SeededRandom::new(7);

        assert_eq!(rng1.fork().seed(), rng2.fork().seed());
        assert_ne!(rng1.fork().seed(), rng1.seed());
    }

    #[test]
    fn test_trivial_draws() {
        let mut rng = SeededRandom::new(1);
        assert_eq!(rng.range(5..6).unwrap(), 5);
        assert!(!rng.chance(0, 10).unwrap());
        assert!(rng.chance(10, 10).unwrap());
        assert!(rng.swap_offsets(1).unwrap().is_empty());
    }

    #[test]
    fn test_ranges_at_integer_limits() {
        let mut rng = SeededRandom::new(9);
        assert_eq!(rng.range(i32::MAX..i32::MAX).unwrap(), i32::MAX);
        assert_eq!(rng.range(i32::MIN..i32::MIN).unwrap(), i32::MIN);
        assert_eq!(rng.range(i32::MIN..i32::MIN + 1).unwrap(), i32::MIN);
        let value = rng.range(i32::MIN..i32::MAX).unwrap();
        assert!(value < i32::MAX);
    }

    #[test]
    fn test_swap_offsets_in_bounds() {
        let mut rng = SeededRandom::new(3);
        for _ in 0..50 {
            let offsets = rng.swap_offsets(5).unwrap();
            assert_eq!(offsets.len(), 4);
            for (i, &offset) in offsets.iter().enumerate() {
                assert!(i + offset < 5);
            }
        }
    }

    /// Replays fixed offsets so the shuffle helper can be checked exactly.
    struct FixedOffsets(Vec<usize>);

    impl RandomSource for FixedOffsets {
        fn range(&mut self, range: Range<i32>) -> Result<i32, RollError> {
            Ok(range.start)
        }

        fn chance(&mut self, _numerator: u32, _denominator: u32) -> Result<bool, RollError> {
            Ok(false)
        }

        fn swap_offsets(&mut self, _len: usize) -> Result<SwapOffsets, RollError> {
            Ok(self.0.iter().copied().collect())
        }
    }

    #[test]
    fn test_shuffle_applies_offsets_in_order() {
        let mut items = vec![0, 1, 2];
        shuffle(&mut FixedOffsets(vec![2, 1]), &mut items).unwrap();
        // swap(0, 2) -> [2, 1, 0], then swap(1, 2) -> [2, 0, 1]
        assert_eq!(items, vec![2, 0, 1]);
    }

    #[test]
    fn test_shuffle_identity_for_zero_offsets() {
        let mut items = vec!['x', 'y', 'z'];
        let rng: &mut dyn RandomSource = &mut FixedOffsets(vec![0, 0]);
        shuffle(rng, &mut items).unwrap();
        assert_eq!(items, vec!['x', 'y', 'z']);
    }
}

//! Side identification and per-side data storage.
//!
//! ## SideId
//!
//! Type-safe identifier for one side of an encounter (`p1`, `p2`, ...).
//!
//! ## SideMap
//!
//! Per-side storage backed by `Vec` for O(1) access, indexable by `SideId`.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Side identifier supporting 1-255 sides.
///
/// Side indices are 0-based: the first side is `SideId(0)` and displays as `p1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SideId(pub u8);

impl SideId {
    /// Create a new side ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw side index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all side IDs for an encounter with `side_count` sides.
    ///
    /// ```
    /// use encounter_explorer::core::SideId;
    ///
    /// let sides: Vec<_> = SideId::all(2).collect();
    /// assert_eq!(sides, vec![SideId::new(0), SideId::new(1)]);
    /// ```
    pub fn all(side_count: usize) -> impl DoubleEndedIterator<Item = SideId> {
        (0..side_count as u8).map(SideId)
    }
}

impl std::fmt::Display for SideId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0 + 1)
    }
}

/// Per-side data storage with O(1) access.
///
/// ## Example
///
/// ```
/// use encounter_explorer::core::{SideId, SideMap};
///
/// let mut remaining: SideMap<u32> = SideMap::with_value(2, 3);
/// remaining[SideId::new(1)] -= 1;
/// assert_eq!(remaining[SideId::new(0)], 3);
/// assert_eq!(remaining[SideId::new(1)], 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SideMap<T> {
    data: Vec<T>,
}

impl<T> SideMap<T> {
    /// Create a new SideMap with values from a factory function.
    pub fn new(side_count: usize, factory: impl Fn(SideId) -> T) -> Self {
        assert!(side_count > 0, "Must have at least 1 side");
        assert!(side_count <= 255, "At most 255 sides supported");

        let data = (0..side_count as u8).map(|i| factory(SideId(i))).collect();

        Self { data }
    }

    /// Create a new SideMap with all entries set to the same value.
    pub fn with_value(side_count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::new(side_count, |_| value.clone())
    }

    /// Create a new SideMap with default values.
    pub fn with_default(side_count: usize) -> Self
    where
        T: Default,
    {
        Self::new(side_count, |_| T::default())
    }

    /// Get the number of sides.
    #[must_use]
    pub fn side_count(&self) -> usize {
        self.data.len()
    }

    /// Get a side's entry, or `None` if the side is out of range.
    #[must_use]
    pub fn get(&self, side: SideId) -> Option<&T> {
        self.data.get(side.index())
    }

    /// Get a mutable reference to a side's entry.
    pub fn get_mut(&mut self, side: SideId) -> Option<&mut T> {
        self.data.get_mut(side.index())
    }

    /// Iterate over (SideId, &T) pairs.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (SideId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (SideId(i as u8), v))
    }

    /// Iterate over (SideId, &mut T) pairs.
    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = (SideId, &mut T)> {
        self.data
            .iter_mut()
            .enumerate()
            .map(|(i, v)| (SideId(i as u8), v))
    }

    /// Iterate over all side IDs.
    pub fn side_ids(&self) -> impl DoubleEndedIterator<Item = SideId> {
        SideId::all(self.data.len())
    }
}

impl<T> Index<SideId> for SideMap<T> {
    type Output = T;

    fn index(&self, side: SideId) -> &Self::Output {
        &self.data[side.index()]
    }
}

impl<T> IndexMut<SideId> for SideMap<T> {
    fn index_mut(&mut self, side: SideId) -> &mut Self::Output {
        &mut self.data[side.index()]
    }
}

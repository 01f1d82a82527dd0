//! Exhaustive exploration: explore a path, ask the enumerator for the next
//! one, repeat until the tree is exhausted.

pub mod explore;

pub use explore::{ExplorationResult, ExplorerRunner, RunSummary};

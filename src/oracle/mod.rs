//! Replay/record random source substituted for an engine's live randomness.

pub mod replay;

pub use replay::ReplayOracle;

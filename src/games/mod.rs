//! Engines implementing the battle protocol.

pub mod duel;

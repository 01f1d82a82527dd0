//! Rule engine protocol consumed by the explorer.
//!
//! The explorer calls into `BattleEngine` but never interprets
//! game-specific concepts directly.

pub mod protocol;

pub use protocol::{ActiveSlot, BattleEngine, SideRequest, Snapshot};

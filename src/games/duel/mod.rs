//! A small two-sided battle used as the fixture encounter.
//!
//! - Each side fields one or more active units from a team
//! - Every turn, each active unit picks a move (or switches out)
//! - Actions go by priority, then speed; speed ties are shuffled
//!   (exploration only ever sees a two-way tie in its first order, since
//!   a two-item shuffle has a single encoding)
//! - Moves can miss, crit, and roll damage variance
//! - Fainted units are replaced from the bench; a side with nobody left loses
//!
//! Narration uses `|kind|args` lines, e.g. `|move|p1a: Wyvern|Thunderbolt|p2a: Sentinel`.

mod combatant;
mod game;

pub use combatant::{base_damage, Combatant, MoveSpec};
pub use game::{Duel, DuelBuilder};

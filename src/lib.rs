//! # encounter-explorer
//!
//! Exhaustive enumeration of every reachable outcome of a turn-based
//! encounter, by replaying it with every combination of player choices and
//! every value of every random draw.
//!
//! ## Design Principles
//!
//! 1. **Engine-Agnostic**: The explorer drives any engine implementing
//!    `BattleEngine` through side requests and string commands. It never
//!    looks inside game state.
//!
//! 2. **Deterministic Replay**: Engines draw every random value from an
//!    injected `RandomSource`. Replaying a path reproduces its narration
//!    exactly, and a replay that drifts is an error, never a silent
//!    divergence.
//!
//! 3. **Lazy Discovery**: Rolls are recorded as the engine asks for them,
//!    always starting at the minimum of their domain. The enumerator only
//!    moves cursors; it never recomputes option lists.
//!
//! ## Architecture
//!
//! - **Paths as Numbers**: A path is a mixed-radix number. Rolls are the
//!   fastest-varying digits, then choice slots, then earlier rounds.
//!
//! - **Persistent Data Structures**: Paths are backed by `im-rs`, so each
//!   new path shares every unchanged round with the one it came from.
//!
//! - **Private Engines**: Every exploration restores its own engine from a
//!   snapshot. Explorations share nothing and parallelize trivially.
//!
//! ## Modules
//!
//! - `core`: Side IDs, random sources, configuration, errors
//! - `record`: Rolls, choice slots, decisions (rounds) and paths
//! - `oracle`: Replaying random source
//! - `search`: Next-path enumeration
//! - `engine`: The battle engine protocol
//! - `driver`: Plays one path through an engine
//! - `runner`: Explore → next → explore loop
//! - `service`: Background jobs and paginated results
//! - `games`: Fixture engines

pub mod core;
pub mod driver;
pub mod engine;
pub mod games;
pub mod oracle;
pub mod record;
pub mod runner;
pub mod search;
pub mod service;

// Re-export commonly used types
pub use crate::core::{
    EngineError, ExplorerConfig, ExplorerError, RandomSource, RollError, SeededRandom,
    ServiceConfig, ServiceError, SideId, SideMap,
};

pub use crate::record::{ChoiceSlot, Decision, Path, Roll, RollDomain};

pub use crate::oracle::ReplayOracle;

pub use crate::search::Enumerator;

pub use crate::engine::{ActiveSlot, BattleEngine, SideRequest, Snapshot};

pub use crate::driver::{Explorer, Outcome};

pub use crate::runner::{ExplorationResult, ExplorerRunner, RunSummary};

pub use crate::service::{JobId, StatusService, WorkPool};

//! Core types: sides, random sources, configuration, errors.
//!
//! These are shared by every other module and know nothing about
//! paths or engines beyond the draw protocol.

pub mod config;
pub mod error;
pub mod rng;
pub mod side;

pub use config::{ExplorerConfig, ServiceConfig};
pub use error::{EngineError, ExplorerError, RollError, ServiceError};
pub use rng::{shuffle, RandomSource, SeededRandom, SwapOffsets};
pub use side::{SideId, SideMap};

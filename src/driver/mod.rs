//! Exploration driver: plays one path through an engine and reports how
//! it ended.

pub mod completion;
pub mod explorer;

pub use completion::{CompletionSignal, Outcome};
pub use explorer::{Explorer, ExplorerParts};

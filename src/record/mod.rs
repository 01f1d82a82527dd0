//! Path model: rolls, choice slots, decisions and paths.
//!
//! Pure data. Paths are read by the driver, extended while a playthrough
//! runs, and derived from one another by the enumerator.

pub mod decision;
pub mod path;
pub mod roll;

pub use decision::{ChoiceSlot, Decision};
pub use path::Path;
pub use roll::{Roll, RollDomain};

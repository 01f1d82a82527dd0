//! Path enumeration: the backtracking step from one explored path to the
//! next unexplored one.

pub mod enumerator;

pub use enumerator::Enumerator;

//! # Utilities Module
//!
//! Randomness helpers used by the generator and a state-space solver for
//! checking that finished dungeons can be completed.

pub mod random;
pub mod reachability;

pub use random::*;
pub use reachability::*;

//! # Puzzle Module
//!
//! The lock-and-key vocabulary shared by the dungeon graph and the generator:
//! [`Symbol`]s name keys, locks and room markers, and [`Condition`]s describe
//! what a player must hold to reach a room.

pub mod condition;
pub mod symbol;

pub use condition::*;
pub use symbol::*;

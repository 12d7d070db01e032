//! # Lockwork
//!
//! Procedural generation of lock-and-key dungeons: connected room graphs in
//! which progress is gated by keys and a single binary switch, solvable by
//! construction.
//!
//! ## Architecture Overview
//!
//! - **Puzzle**: [`Symbol`]s for keys, locks and room markers, and the
//!   [`Condition`] algebra describing what a player must hold
//! - **Dungeon**: the arena-backed room graph ([`Dungeon`], [`Room`], [`Edge`])
//! - **Constraints**: the [`DungeonConstraints`] trait through which callers
//!   decide room adjacency, capacity and acceptance, plus grid, space-map and
//!   freeform implementations
//! - **Generation**: the [`LockAndKeyGenerator`] that places rooms, locks,
//!   the boss, the switch and the keys, retrying until the result is valid
//!
//! ## Example
//!
//! ```
//! use lockwork::{CountConstraints, GenerationConfig, LockAndKeyGenerator};
//!
//! let generator = LockAndKeyGenerator::new(CountConstraints::new(25, 2, 0));
//! let dungeon = generator.generate_seeded(&GenerationConfig::new(7))?;
//!
//! assert_eq!(dungeon.room_count(), 25);
//! assert!(dungeon.find_boss().is_some());
//! # Ok::<(), lockwork::LockworkError>(())
//! ```

pub mod constraints;
pub mod dungeon;
pub mod generation;
pub mod puzzle;
pub mod utils;

pub use constraints::*;
pub use dungeon::*;
pub use generation::*;
pub use puzzle::*;
pub use utils::*;

/// Core error type for the Lockwork generator.
#[derive(thiserror::Error, Debug)]
pub enum LockworkError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Generation parameters or constraints are unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The room graph was used incorrectly
    #[error("Invalid room: {0}")]
    InvalidRoom(String),

    /// Generation failed and will not be retried
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type used throughout the Lockwork codebase.
pub type LockworkResult<T> = Result<T, LockworkError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Generation constants.
pub mod config {
    /// Whole-attempt retries before generation gives up
    pub const DEFAULT_MAX_RETRIES: u32 = 20;

    /// Chance of adding an extra edge between eligible rooms during graphify
    pub const DEFAULT_GRAPHIFY_PROBABILITY: f64 = 0.2;

    /// Highest number of distinct keys a condition can hold
    pub const MAX_KEYS: usize = 64;

    /// Key limit of a freshly built space-map constraint set
    pub const SPACE_DEFAULT_MAX_KEYS: usize = 4;

    /// Switch limit of a freshly built space-map constraint set
    pub const SPACE_DEFAULT_MAX_SWITCHES: usize = 1;

    /// Key limit of a freshly built freeform constraint set
    pub const FREEFORM_DEFAULT_MAX_KEYS: usize = 8;
}

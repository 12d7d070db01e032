//! # Constraints Module
//!
//! The capability interface through which a caller shapes generation: which
//! room ids exist and neighbour each other, how many rooms, keys and switches
//! may be placed, where items fit, and whether a finished dungeon is
//! acceptable.
//!
//! The generator depends only on [`DungeonConstraints`]. Three providers are
//! included:
//! - [`CountConstraints`]: 1x1 rooms on an open half-plane grid
//! - [`SpaceConstraints`]: 1x1 rooms restricted to the cells of a [`SpaceMap`]
//! - [`FreeformConstraints`]: multi-cell rooms read from a [`ColorMap`]

pub mod count;
pub mod freeform;
pub mod space;

pub use count::*;
pub use freeform::*;
pub use space::*;

use crate::dungeon::{Coord, Dungeon, RoomId};
use crate::puzzle::Symbol;

/// Limits and geometry consulted by the generator.
///
/// Implementations are never mutated by the generator, but their answers may
/// be randomized or returned in any order.
pub trait DungeonConstraints {
    /// Maximum number of rooms to place.
    fn max_rooms(&self) -> usize;

    /// Number of ordinary keys the dungeon must contain.
    fn max_keys(&self) -> usize;

    /// Maximum number of switches. Only one switch is ever placed.
    fn max_switches(&self) -> usize;

    /// Room ids from which the entrance may be picked.
    fn initial_rooms(&self) -> Vec<RoomId>;

    /// Weighted ids of rooms that may be linked to `id` at the given key level.
    fn adjacent_rooms(&self, id: RoomId, key_level: usize) -> Vec<(f64, RoomId)>;

    /// Probability of adding an extra edge between the two rooms during graphify.
    fn edge_graphify_probability(&self, id: RoomId, next_id: RoomId) -> f64;

    /// Coordinates occupied by the room with the given id.
    fn coords(&self, id: RoomId) -> Vec<Coord>;

    /// Final check on a finished dungeon. Returning `false` forces a retry.
    fn is_acceptable(&self, dungeon: &Dungeon) -> bool;

    /// Whether the given item may be placed in the room.
    fn room_can_fit_item(&self, id: RoomId, item: Symbol) -> bool;
}

impl<T: DungeonConstraints + ?Sized> DungeonConstraints for &T {
    fn max_rooms(&self) -> usize {
        (**self).max_rooms()
    }

    fn max_keys(&self) -> usize {
        (**self).max_keys()
    }

    fn max_switches(&self) -> usize {
        (**self).max_switches()
    }

    fn initial_rooms(&self) -> Vec<RoomId> {
        (**self).initial_rooms()
    }

    fn adjacent_rooms(&self, id: RoomId, key_level: usize) -> Vec<(f64, RoomId)> {
        (**self).adjacent_rooms(id, key_level)
    }

    fn edge_graphify_probability(&self, id: RoomId, next_id: RoomId) -> f64 {
        (**self).edge_graphify_probability(id, next_id)
    }

    fn coords(&self, id: RoomId) -> Vec<Coord> {
        (**self).coords(id)
    }

    fn is_acceptable(&self, dungeon: &Dungeon) -> bool {
        (**self).is_acceptable(dungeon)
    }

    fn room_can_fit_item(&self, id: RoomId, item: Symbol) -> bool {
        (**self).room_can_fit_item(id, item)
    }
}

impl<T: DungeonConstraints + ?Sized> DungeonConstraints for Box<T> {
    fn max_rooms(&self) -> usize {
        (**self).max_rooms()
    }

    fn max_keys(&self) -> usize {
        (**self).max_keys()
    }

    fn max_switches(&self) -> usize {
        (**self).max_switches()
    }

    fn initial_rooms(&self) -> Vec<RoomId> {
        (**self).initial_rooms()
    }

    fn adjacent_rooms(&self, id: RoomId, key_level: usize) -> Vec<(f64, RoomId)> {
        (**self).adjacent_rooms(id, key_level)
    }

    fn edge_graphify_probability(&self, id: RoomId, next_id: RoomId) -> f64 {
        (**self).edge_graphify_probability(id, next_id)
    }

    fn coords(&self, id: RoomId) -> Vec<Coord> {
        (**self).coords(id)
    }

    fn is_acceptable(&self, dungeon: &Dungeon) -> bool {
        (**self).is_acceptable(dungeon)
    }

    fn room_can_fit_item(&self, id: RoomId, item: Symbol) -> bool {
        (**self).room_can_fit_item(id, item)
    }
}

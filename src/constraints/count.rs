//! # Count Constraints
//!
//! Limits the number of rooms, keys and switches, and lays 1x1 rooms out on a
//! grid.

use super::DungeonConstraints;
use crate::config::DEFAULT_GRAPHIFY_PROBABILITY;
use crate::dungeon::{Coord, Dungeon, RoomId};
use crate::puzzle::Symbol;
use std::collections::HashMap;

/// Bidirectional mapping between grid cells and dense room ids.
///
/// Ids are handed out in the order cells are supplied, so callers that list
/// cells nearest-first get small ids for the rooms most likely to be used.
#[derive(Debug, Clone, Default)]
pub struct GridIndex {
    coords: Vec<Coord>,
    ids: HashMap<Coord, RoomId>,
}

impl GridIndex {
    /// Builds an index over the given cells. Repeated cells keep their first id.
    pub fn from_cells(cells: impl IntoIterator<Item = Coord>) -> Self {
        let mut index = Self::default();
        for cell in cells {
            if !index.ids.contains_key(&cell) {
                index.ids.insert(cell, index.coords.len());
                index.coords.push(cell);
            }
        }
        index
    }

    pub fn id_of(&self, coord: Coord) -> Option<RoomId> {
        self.ids.get(&coord).copied()
    }

    pub fn coord_of(&self, id: RoomId) -> Option<Coord> {
        self.coords.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Ids of the cardinal neighbours of `id` that are part of the grid,
    /// each with weight 1.0.
    pub fn cardinal_neighbors(&self, id: RoomId) -> Vec<(f64, RoomId)> {
        let Some(coord) = self.coord_of(id) else {
            return Vec::new();
        };
        coord
            .cardinal_neighbors()
            .into_iter()
            .filter_map(|neighbor| self.id_of(neighbor))
            .map(|neighbor| (1.0, neighbor))
            .collect()
    }
}

/// Constrains generation by the number of rooms, keys and switches only.
///
/// Rooms are single cells on the half plane `y <= 0`, entered from the room
/// at the origin. Cells further than `max_rooms` steps from the origin can
/// never be reached and are left out of the grid.
///
/// # Examples
///
/// ```
/// use lockwork::{Coord, CountConstraints, DungeonConstraints};
///
/// let constraints = CountConstraints::new(10, 2, 1);
/// let entrance = constraints.initial_rooms()[0];
/// assert_eq!(constraints.coords(entrance), vec![Coord::new(0, 0)]);
/// // No neighbour below the origin row
/// assert_eq!(constraints.adjacent_rooms(entrance, 0).len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct CountConstraints {
    max_rooms: usize,
    max_keys: usize,
    max_switches: usize,
    grid: GridIndex,
}

impl CountConstraints {
    pub fn new(max_rooms: usize, max_keys: usize, max_switches: usize) -> Self {
        Self {
            max_rooms,
            max_keys,
            max_switches,
            grid: Self::build_grid(max_rooms),
        }
    }

    /// Lists cells of the upper half plane within `radius` steps of the
    /// origin, nearest first.
    fn build_grid(radius: usize) -> GridIndex {
        let r = radius.max(1) as i32;
        let mut cells: Vec<Coord> = (-r..=0)
            .flat_map(|y| (-r..=r).map(move |x| Coord::new(x, y)))
            .filter(|c| c.x.abs() + c.y.abs() <= r)
            .collect();
        cells.sort_by_key(|c| (c.x.abs() + c.y.abs(), -c.y, c.x));
        GridIndex::from_cells(cells)
    }

    /// Gets the id of the room at `coord`, if the cell is on the grid.
    pub fn room_id(&self, coord: Coord) -> Option<RoomId> {
        self.grid.id_of(coord)
    }

    /// Gets the cell of the room with the given id.
    pub fn room_coords(&self, id: RoomId) -> Option<Coord> {
        self.grid.coord_of(id)
    }

    pub fn set_max_rooms(&mut self, max_rooms: usize) {
        self.max_rooms = max_rooms;
        self.grid = Self::build_grid(max_rooms);
    }

    pub fn set_max_keys(&mut self, max_keys: usize) {
        self.max_keys = max_keys;
    }

    pub fn set_max_switches(&mut self, max_switches: usize) {
        self.max_switches = max_switches;
    }
}

impl DungeonConstraints for CountConstraints {
    fn max_rooms(&self) -> usize {
        self.max_rooms
    }

    fn max_keys(&self) -> usize {
        self.max_keys
    }

    fn max_switches(&self) -> usize {
        self.max_switches
    }

    fn initial_rooms(&self) -> Vec<RoomId> {
        self.grid.id_of(Coord::new(0, 0)).into_iter().collect()
    }

    fn adjacent_rooms(&self, id: RoomId, _key_level: usize) -> Vec<(f64, RoomId)> {
        self.grid.cardinal_neighbors(id)
    }

    fn edge_graphify_probability(&self, _id: RoomId, _next_id: RoomId) -> f64 {
        DEFAULT_GRAPHIFY_PROBABILITY
    }

    fn coords(&self, id: RoomId) -> Vec<Coord> {
        self.grid.coord_of(id).into_iter().collect()
    }

    fn is_acceptable(&self, _dungeon: &Dungeon) -> bool {
        true
    }

    fn room_can_fit_item(&self, _id: RoomId, _item: Symbol) -> bool {
        true
    }
}

//! # Space Constraints
//!
//! Count constraints restricted to the cells of a [`SpaceMap`].

use super::{DungeonConstraints, GridIndex};
use crate::config::{
    DEFAULT_GRAPHIFY_PROBABILITY, SPACE_DEFAULT_MAX_KEYS, SPACE_DEFAULT_MAX_SWITCHES,
};
use crate::dungeon::{Coord, Dungeon, RoomId};
use crate::puzzle::Symbol;
use crate::{LockworkError, LockworkResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The set of cells in which rooms may be created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceMap {
    spaces: BTreeSet<Coord>,
}

impl SpaceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from rows of text, where `#` marks a usable cell.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockwork::SpaceMap;
    ///
    /// let map = SpaceMap::from_rows(&["##.", ".##"]);
    /// assert_eq!(map.number_spaces(), 4);
    /// ```
    pub fn from_rows(rows: &[&str]) -> Self {
        let mut map = Self::new();
        for (y, row) in rows.iter().enumerate() {
            for (x, cell) in row.chars().enumerate() {
                if cell == '#' {
                    map.set(Coord::new(x as i32, y as i32), true);
                }
            }
        }
        map
    }

    pub fn number_spaces(&self) -> usize {
        self.spaces.len()
    }

    pub fn get(&self, coord: Coord) -> bool {
        self.spaces.contains(&coord)
    }

    pub fn set(&mut self, coord: Coord, usable: bool) {
        if usable {
            self.spaces.insert(coord);
        } else {
            self.spaces.remove(&coord);
        }
    }

    /// Iterates over the usable cells in coordinate order.
    pub fn spaces(&self) -> impl Iterator<Item = Coord> + '_ {
        self.spaces.iter().copied()
    }

    /// Gets the usable cells on the bottom-most (largest `y`) row.
    pub fn bottom_spaces(&self) -> Vec<Coord> {
        let Some(bottom) = self.spaces.iter().map(|c| c.y).max() else {
            return Vec::new();
        };
        self.spaces.iter().copied().filter(|c| c.y == bottom).collect()
    }
}

/// Places 1x1 rooms only within a [`SpaceMap`], entering from its bottom row.
#[derive(Debug, Clone)]
pub struct SpaceConstraints {
    space_map: SpaceMap,
    max_rooms: usize,
    max_keys: usize,
    max_switches: usize,
    grid: GridIndex,
}

impl SpaceConstraints {
    /// Creates constraints allowing one room per usable cell.
    ///
    /// Fails if the map has no usable cells.
    pub fn new(space_map: SpaceMap) -> LockworkResult<Self> {
        if space_map.number_spaces() == 0 {
            return Err(LockworkError::InvalidConfig(
                "Space map has no usable cells".to_string(),
            ));
        }
        let grid = GridIndex::from_cells(space_map.spaces());
        Ok(Self {
            max_rooms: space_map.number_spaces(),
            max_keys: SPACE_DEFAULT_MAX_KEYS,
            max_switches: SPACE_DEFAULT_MAX_SWITCHES,
            space_map,
            grid,
        })
    }

    pub fn space_map(&self) -> &SpaceMap {
        &self.space_map
    }

    pub fn room_id(&self, coord: Coord) -> Option<RoomId> {
        self.grid.id_of(coord)
    }

    pub fn set_max_rooms(&mut self, max_rooms: usize) {
        self.max_rooms = max_rooms.min(self.space_map.number_spaces());
    }

    pub fn set_max_keys(&mut self, max_keys: usize) {
        self.max_keys = max_keys;
    }

    pub fn set_max_switches(&mut self, max_switches: usize) {
        self.max_switches = max_switches;
    }
}

impl DungeonConstraints for SpaceConstraints {
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
        self.space_map
            .bottom_spaces()
            .into_iter()
            .filter_map(|coord| self.grid.id_of(coord))
            .collect()
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

//! # Freeform Constraints
//!
//! Rooms of arbitrary shape, read from a colour map where each colour marks
//! one room.

use super::DungeonConstraints;
use crate::config::{DEFAULT_GRAPHIFY_PROBABILITY, FREEFORM_DEFAULT_MAX_KEYS};
use crate::dungeon::{Coord, Dungeon, RoomId};
use crate::puzzle::Symbol;
use crate::{LockworkError, LockworkResult};
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::fmt;

/// Assigns a colour (room id) to each cell of a map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorMap {
    cells: BTreeMap<Coord, RoomId>,
}

impl ColorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from rows of text. Each digit or letter is a colour
    /// (`0`-`9` then `a`-`z`); any other character leaves the cell empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockwork::ColorMap;
    ///
    /// let map = ColorMap::from_rows(&["001", "221"]);
    /// assert_eq!(map.get(2, 1), Some(1));
    /// assert_eq!(map.width(), 3);
    /// ```
    pub fn from_rows(rows: &[&str]) -> Self {
        let mut map = Self::new();
        for (y, row) in rows.iter().enumerate() {
            for (x, cell) in row.chars().enumerate() {
                if let Some(color) = cell.to_digit(36) {
                    map.set(x as i32, y as i32, color as RoomId);
                }
            }
        }
        map
    }

    pub fn set(&mut self, x: i32, y: i32, color: RoomId) {
        self.cells.insert(Coord::new(x, y), color);
    }

    pub fn get(&self, x: i32, y: i32) -> Option<RoomId> {
        self.cells.get(&Coord::new(x, y)).copied()
    }

    /// Iterates over the coloured cells in coordinate order.
    pub fn cells(&self) -> impl Iterator<Item = (Coord, RoomId)> + '_ {
        self.cells.iter().map(|(&coord, &color)| (coord, color))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn left(&self) -> i32 {
        self.cells.keys().map(|c| c.x).min().unwrap_or(0)
    }

    pub fn right(&self) -> i32 {
        self.cells.keys().map(|c| c.x).max().unwrap_or(0)
    }

    pub fn top(&self) -> i32 {
        self.cells.keys().map(|c| c.y).min().unwrap_or(0)
    }

    pub fn bottom(&self) -> i32 {
        self.cells.keys().map(|c| c.y).max().unwrap_or(0)
    }

    pub fn width(&self) -> u32 {
        if self.is_empty() {
            return 0;
        }
        (self.right() - self.left() + 1) as u32
    }

    pub fn height(&self) -> u32 {
        if self.is_empty() {
            return 0;
        }
        (self.bottom() - self.top() + 1) as u32
    }

    /// Integer centroid of the coloured cells.
    pub fn center(&self) -> Option<Coord> {
        let coords: Vec<Coord> = self.cells.keys().copied().collect();
        Coord::centroid(&coords)
    }

    /// Whether every coloured cell can be reached from every other through
    /// orthogonal steps over coloured cells.
    pub fn is_connected(&self) -> bool {
        let Some(&first) = self.cells.keys().next() else {
            return false;
        };

        let mut visited = HashSet::from([first]);
        let mut queue = VecDeque::from([first]);
        while let Some(pos) = queue.pop_front() {
            for neighbor in pos.cardinal_neighbors() {
                if self.cells.contains_key(&neighbor) && visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        visited.len() == self.cells.len()
    }

    pub fn check_connected(&self) -> LockworkResult<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(LockworkError::InvalidConfig(
                "Color map is not fully connected".to_string(),
            ))
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Group {
    coords: BTreeSet<Coord>,
    adjacent: BTreeSet<RoomId>,
}

type AdjacencyFilter = Box<dyn Fn(RoomId, RoomId) -> bool>;

/// Treats each colour region of a [`ColorMap`] as one room.
///
/// Regions sharing an orthogonal border are adjacent unless an adjacency
/// filter rejects the pair. Colours are used directly as room ids and should
/// therefore be small.
pub struct FreeformConstraints {
    groups: BTreeMap<RoomId, Group>,
    max_keys: usize,
}

impl fmt::Debug for FreeformConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FreeformConstraints")
            .field("rooms", &self.groups.len())
            .field("max_keys", &self.max_keys)
            .finish()
    }
}

impl FreeformConstraints {
    /// Analyzes the colour map into rooms.
    ///
    /// Fails if the map is empty or the rooms are not all connected.
    pub fn new(color_map: &ColorMap) -> LockworkResult<Self> {
        Self::with_adjacency_filter(color_map, Box::new(|_, _| true))
    }

    /// Like [`FreeformConstraints::new`], but only lets two regions neighbour
    /// each other when `allow(a, b)` holds. The filter is consulted once per
    /// bordering pair while the map is analyzed.
    pub fn with_adjacency_filter(
        color_map: &ColorMap,
        allow: AdjacencyFilter,
    ) -> LockworkResult<Self> {
        color_map.check_connected()?;

        let mut groups: BTreeMap<RoomId, Group> = BTreeMap::new();
        for (coord, color) in color_map.cells() {
            groups.entry(color).or_default().coords.insert(coord);
        }

        let mut checked: HashSet<(RoomId, RoomId)> = HashSet::new();
        let mut allowed: HashSet<(RoomId, RoomId)> = HashSet::new();
        for (coord, color) in color_map.cells() {
            for neighbor in coord.cardinal_neighbors() {
                let Some(other) = color_map.get(neighbor.x, neighbor.y) else {
                    continue;
                };
                if other == color {
                    continue;
                }
                if checked.insert((color, other)) && allow(color, other) {
                    allowed.insert((color, other));
                }
                if allowed.contains(&(color, other)) {
                    if let Some(group) = groups.get_mut(&color) {
                        group.adjacent.insert(other);
                    }
                }
            }
        }

        let constraints = Self {
            groups,
            max_keys: FREEFORM_DEFAULT_MAX_KEYS,
        };
        constraints.check_connected()?;
        Ok(constraints)
    }

    /// Whether every room can be reached through the adjacency relation.
    pub fn is_connected(&self) -> bool {
        let Some(&first) = self.groups.keys().next() else {
            return false;
        };

        let mut visited = HashSet::from([first]);
        let mut queue = VecDeque::from([first]);
        while let Some(id) = queue.pop_front() {
            for (_, next) in self.adjacent_rooms(id, usize::MAX) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        visited.len() == self.groups.len()
    }

    fn check_connected(&self) -> LockworkResult<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(LockworkError::InvalidConfig(
                "Rooms of the color map are not fully connected".to_string(),
            ))
        }
    }

    pub fn set_max_keys(&mut self, max_keys: usize) {
        self.max_keys = max_keys;
    }
}

impl DungeonConstraints for FreeformConstraints {
    fn max_rooms(&self) -> usize {
        self.groups.len()
    }

    fn max_keys(&self) -> usize {
        self.max_keys
    }

    fn max_switches(&self) -> usize {
        0
    }

    fn initial_rooms(&self) -> Vec<RoomId> {
        self.groups.keys().next().copied().into_iter().collect()
    }

    fn adjacent_rooms(&self, id: RoomId, _key_level: usize) -> Vec<(f64, RoomId)> {
        self.groups
            .get(&id)
            .map(|group| group.adjacent.iter().map(|&next| (1.0, next)).collect())
            .unwrap_or_default()
    }

    fn edge_graphify_probability(&self, _id: RoomId, _next_id: RoomId) -> f64 {
        DEFAULT_GRAPHIFY_PROBABILITY
    }

    fn coords(&self, id: RoomId) -> Vec<Coord> {
        self.groups
            .get(&id)
            .map(|group| group.coords.iter().copied().collect())
            .unwrap_or_default()
    }

    fn is_acceptable(&self, _dungeon: &Dungeon) -> bool {
        true
    }

    fn room_can_fit_item(&self, _id: RoomId, _item: Symbol) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_map_geometry() {
        let map = ColorMap::from_rows(&["0011", "0.11"]);
        assert_eq!(map.left(), 0);
        assert_eq!(map.right(), 3);
        assert_eq!(map.top(), 0);
        assert_eq!(map.bottom(), 1);
        assert_eq!(map.width(), 4);
        assert_eq!(map.height(), 2);
        assert_eq!(map.get(1, 1), None);
        assert_eq!(map.center(), Some(Coord::new(1, 0)));
    }

    #[test]
    fn test_color_map_connectivity() {
        assert!(ColorMap::from_rows(&["01", "23"]).is_connected());
        assert!(!ColorMap::from_rows(&["0.1"]).is_connected());
        assert!(!ColorMap::new().is_connected());
        assert!(ColorMap::from_rows(&["0.1"]).check_connected().is_err());
    }

    #[test]
    fn test_regions_become_rooms() -> LockworkResult<()> {
        let map = ColorMap::from_rows(&["0011", "2211", "2233"]);
        let constraints = FreeformConstraints::new(&map)?;

        assert_eq!(constraints.max_rooms(), 4);
        assert_eq!(constraints.max_switches(), 0);
        assert_eq!(constraints.max_keys(), FREEFORM_DEFAULT_MAX_KEYS);
        assert_eq!(constraints.initial_rooms(), vec![0]);
        assert_eq!(constraints.coords(1).len(), 4);

        let neighbors: Vec<RoomId> = constraints
            .adjacent_rooms(0, 0)
            .into_iter()
            .map(|(_, id)| id)
            .collect();
        assert_eq!(neighbors, vec![1, 2]);
        Ok(())
    }

    #[test]
    fn test_adjacency_filter_can_disconnect() {
        let map = ColorMap::from_rows(&["012"]);
        let result = FreeformConstraints::with_adjacency_filter(
            &map,
            Box::new(|a, b| !(a == 1 && b == 2) && !(a == 2 && b == 1)),
        );
        assert!(matches!(result, Err(LockworkError::InvalidConfig(_))));
    }

    #[test]
    fn test_adjacency_filter_prunes_edges() -> LockworkResult<()> {
        let map = ColorMap::from_rows(&["01", "23"]);
        let constraints = FreeformConstraints::with_adjacency_filter(
            &map,
            Box::new(|a, b| a + b != 1),
        )?;
        let neighbors: Vec<RoomId> = constraints
            .adjacent_rooms(0, 0)
            .into_iter()
            .map(|(_, id)| id)
            .collect();
        assert_eq!(neighbors, vec![2]);
        Ok(())
    }
}

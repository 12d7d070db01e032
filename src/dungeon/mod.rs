//! # Dungeon Module
//!
//! The room graph built by the generator and handed to consumers.
//!
//! Rooms live in a dense arena indexed by [`RoomId`]. Tree relations (parent
//! and children) and navigation edges are stored as ids, so the graph can
//! become cyclic after graphify without any shared ownership.

pub mod room;

pub use room::*;

use crate::puzzle::Symbol;
use crate::{LockworkError, LockworkResult};
use serde::{Deserialize, Serialize};

/// A cell occupied by a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the four orthogonally adjacent coordinates.
    pub fn cardinal_neighbors(self) -> [Coord; 4] {
        [
            Coord::new(self.x, self.y - 1),
            Coord::new(self.x + 1, self.y),
            Coord::new(self.x, self.y + 1),
            Coord::new(self.x - 1, self.y),
        ]
    }

    /// Integer centroid of a set of coordinates, truncating toward zero.
    pub fn centroid(coords: &[Coord]) -> Option<Coord> {
        if coords.is_empty() {
            return None;
        }
        let count = coords.len() as i64;
        let (x, y) = coords.iter().fold((0i64, 0i64), |(x, y), c| {
            (x + c.x as i64, y + c.y as i64)
        });
        Some(Coord::new((x / count) as i32, (y / count) as i32))
    }
}

/// Rectangle covering every occupied coordinate.
///
/// `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    /// Bounds covering exactly one cell.
    pub fn around(coord: Coord) -> Self {
        Self {
            left: coord.x,
            top: coord.y,
            right: coord.x + 1,
            bottom: coord.y + 1,
        }
    }

    /// Grows the bounds to include `coord`.
    pub fn extend(&mut self, coord: Coord) {
        self.left = self.left.min(coord.x);
        self.top = self.top.min(coord.y);
        self.right = self.right.max(coord.x + 1);
        self.bottom = self.bottom.max(coord.y + 1);
    }

    pub fn width(&self) -> u32 {
        (self.right - self.left) as u32
    }

    pub fn height(&self) -> u32 {
        (self.bottom - self.top) as u32
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.x >= self.left && coord.x < self.right && coord.y >= self.top && coord.y < self.bottom
    }
}

/// The whole room graph.
///
/// Room ids are assumed to be low and tightly packed, so rooms are stored in
/// a vector indexed by id. Iteration always follows id order.
///
/// # Examples
///
/// ```
/// use lockwork::{Condition, Coord, Dungeon, Room, Symbol};
///
/// let mut dungeon = Dungeon::new();
/// dungeon.add(Room::new(0, vec![Coord::new(0, 0)], None, Some(Symbol::start()), Condition::empty())?)?;
/// dungeon.add(Room::new(1, vec![Coord::new(1, 0)], Some(0), None, Condition::empty())?)?;
/// dungeon.link(0, 1, None)?;
///
/// assert!(dungeon.rooms_are_linked(0, 1));
/// assert_eq!(dungeon.find_start().map(|room| room.id), Some(0));
/// assert_eq!(dungeon.bounds().map(|b| b.width()), Some(2));
/// # Ok::<(), lockwork::LockworkError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "DungeonData", try_from = "DungeonData")]
pub struct Dungeon {
    rooms: Vec<Option<Room>>,
    room_count: usize,
    bounds: Option<Bounds>,
}

/// Serialized form of a [`Dungeon`]: the bounds and the list of rooms.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DungeonData {
    bounds: Option<Bounds>,
    rooms: Vec<Room>,
}

impl From<Dungeon> for DungeonData {
    fn from(dungeon: Dungeon) -> Self {
        Self {
            bounds: dungeon.bounds,
            rooms: dungeon.rooms.into_iter().flatten().collect(),
        }
    }
}

impl TryFrom<DungeonData> for Dungeon {
    type Error = LockworkError;

    fn try_from(data: DungeonData) -> Result<Self, Self::Error> {
        let mut dungeon = Dungeon::new();
        for room in data.rooms {
            dungeon.add(room)?;
        }
        Ok(dungeon)
    }
}

impl Dungeon {
    /// Creates an empty dungeon.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the rectangle covering every room, or `None` while empty.
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Iterates over the rooms in id order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter().flatten()
    }

    /// Gets the ids of all rooms in id order.
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms().map(|room| room.id).collect()
    }

    pub fn room_count(&self) -> usize {
        self.room_count
    }

    pub fn is_empty(&self) -> bool {
        self.room_count == 0
    }

    pub fn contains(&self, id: RoomId) -> bool {
        self.room(id).is_some()
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id).and_then(Option::as_ref)
    }

    pub fn room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(id).and_then(Option::as_mut)
    }

    /// Registers a room and extends the bounds to cover it.
    ///
    /// Fails if a room with the same id already exists.
    pub fn add(&mut self, room: Room) -> LockworkResult<()> {
        if self.contains(room.id) {
            return Err(LockworkError::InvalidRoom(format!(
                "Room {} already exists",
                room.id
            )));
        }

        for &coord in room.coords() {
            match self.bounds.as_mut() {
                Some(bounds) => bounds.extend(coord),
                None => self.bounds = Some(Bounds::around(coord)),
            }
        }

        let id = room.id;
        if id >= self.rooms.len() {
            self.rooms.resize_with(id + 1, || None);
        }
        self.rooms[id] = Some(room);
        self.room_count += 1;
        Ok(())
    }

    /// Creates or overwrites the edge from `from` to `to`.
    pub fn link_one_way(
        &mut self,
        from: RoomId,
        to: RoomId,
        symbol: Option<Symbol>,
    ) -> LockworkResult<()> {
        if !self.contains(to) {
            return Err(LockworkError::InvalidRoom(format!(
                "Cannot link to missing room {}",
                to
            )));
        }
        let room = self.room_mut(from).ok_or_else(|| {
            LockworkError::InvalidRoom(format!("Cannot link from missing room {}", from))
        })?;
        room.set_edge(to, symbol);
        Ok(())
    }

    /// Links two rooms in both directions with the same symbol.
    pub fn link(&mut self, a: RoomId, b: RoomId, symbol: Option<Symbol>) -> LockworkResult<()> {
        self.link_one_way(a, b, symbol)?;
        self.link_one_way(b, a, symbol)
    }

    /// Whether either room has an edge to the other.
    pub fn rooms_are_linked(&self, a: RoomId, b: RoomId) -> bool {
        let forward = self.room(a).is_some_and(|room| room.edge(b).is_some());
        let backward = self.room(b).is_some_and(|room| room.edge(a).is_some());
        forward || backward
    }

    fn find_item(&self, predicate: impl Fn(&Room) -> bool) -> Option<&Room> {
        self.rooms().find(|room| predicate(room))
    }

    pub fn find_start(&self) -> Option<&Room> {
        self.find_item(Room::is_start)
    }

    pub fn find_goal(&self) -> Option<&Room> {
        self.find_item(Room::is_goal)
    }

    pub fn find_boss(&self) -> Option<&Room> {
        self.find_item(Room::is_boss)
    }

    pub fn find_switch(&self) -> Option<&Room> {
        self.find_item(Room::is_switch)
    }

    /// Path along parent references from the goal (or the boss when there is
    /// no goal room) back to the entrance.
    ///
    /// The first element is the goal end, the last is the entrance. Empty if
    /// neither a goal nor a boss room exists.
    pub fn solution_path(&self) -> Vec<RoomId> {
        let mut path = Vec::new();
        let mut current = self.find_goal().or_else(|| self.find_boss()).map(|room| room.id);
        while let Some(id) = current {
            if path.contains(&id) {
                break;
            }
            path.push(id);
            current = self.room(id).and_then(Room::parent);
        }
        path
    }

    /// Collects `id` and every room below it in the spanning tree.
    pub fn subtree(&self, id: RoomId) -> Vec<RoomId> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(room) = self.room(next) {
                result.push(next);
                stack.extend(room.children().iter().rev());
            }
        }
        result
    }

    /// Serializes the dungeon as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> LockworkResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a dungeon from JSON produced by [`Dungeon::to_json_pretty`].
    pub fn from_json(json: &str) -> LockworkResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

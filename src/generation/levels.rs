//! # Key Levels
//!
//! Groups rooms by the number of distinct keys needed to reach them.

use crate::dungeon::RoomId;

/// Maps each key level to the rooms first reachable at that level.
///
/// All rooms in level 0 are reachable without any key, while reaching a room
/// in level 3 takes at least three keys. Only lives for the duration of one
/// generation attempt.
#[derive(Debug, Clone, Default)]
pub struct KeyLevelRoomMapping {
    levels: Vec<Vec<RoomId>>,
}

impl KeyLevelRoomMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the rooms at `key_level`, empty if the level does not exist yet.
    pub fn rooms(&self, key_level: usize) -> &[RoomId] {
        self.levels.get(key_level).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Gets the rooms at `key_level`, creating the level (and every level
    /// below it) if needed.
    pub fn rooms_mut(&mut self, key_level: usize) -> &mut Vec<RoomId> {
        if key_level >= self.levels.len() {
            self.levels.resize_with(key_level + 1, Vec::new);
        }
        &mut self.levels[key_level]
    }

    pub fn add_room(&mut self, key_level: usize, room: RoomId) {
        self.rooms_mut(key_level).push(room);
    }

    /// Removes `room` from `key_level`. Returns whether it was present.
    pub fn remove_room(&mut self, key_level: usize, room: RoomId) -> bool {
        let Some(rooms) = self.levels.get_mut(key_level) else {
            return false;
        };
        match rooms.iter().position(|&id| id == room) {
            Some(index) => {
                rooms.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of key levels created so far.
    pub fn key_count(&self) -> usize {
        self.levels.len()
    }
}

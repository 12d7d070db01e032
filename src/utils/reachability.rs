//! # Reachability
//!
//! Explores what a player can actually reach in a finished dungeon by
//! searching over player states: current room, keys collected so far and the
//! switch position.

use crate::dungeon::{Dungeon, Edge, RoomId};
use crate::puzzle::SymbolKind;
use pathfinding::prelude::bfs_reach;
use std::collections::BTreeSet;

/// A point in the player's progress through the dungeon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PlayerState {
    room: RoomId,
    keys: u64,
    switch_on: bool,
}

fn collect_item(dungeon: &Dungeon, room: RoomId, keys: u64) -> u64 {
    match dungeon.room(room).and_then(|r| r.item).map(|item| item.kind()) {
        Some(SymbolKind::Key(index)) if index < 64 => keys | (1u64 << index),
        _ => keys,
    }
}

fn can_pass(edge: &Edge, state: &PlayerState) -> bool {
    match edge.symbol.map(|symbol| symbol.kind()) {
        None => true,
        Some(SymbolKind::Key(index)) => index < 64 && state.keys & (1u64 << index) != 0,
        Some(SymbolKind::SwitchOn) => state.switch_on,
        Some(SymbolKind::SwitchOff) => !state.switch_on,
        Some(_) => false,
    }
}

fn successors(dungeon: &Dungeon, state: &PlayerState) -> Vec<PlayerState> {
    let Some(room) = dungeon.room(state.room) else {
        return Vec::new();
    };

    let mut next: Vec<PlayerState> = room
        .edges()
        .iter()
        .filter(|edge| can_pass(edge, state))
        .filter(|edge| dungeon.contains(edge.target))
        .map(|edge| PlayerState {
            room: edge.target,
            keys: collect_item(dungeon, edge.target, state.keys),
            switch_on: state.switch_on,
        })
        .collect();

    if room.is_switch() {
        next.push(PlayerState {
            switch_on: !state.switch_on,
            ..*state
        });
    }

    next
}

/// Gets every room a player starting at the entrance can reach.
///
/// The switch starts off. Keys are collected on entering their room and the
/// switch may be flipped any number of times while standing in the switch
/// room. Returns an empty set if the dungeon has no start room.
pub fn reachable_rooms(dungeon: &Dungeon) -> BTreeSet<RoomId> {
    let Some(start) = dungeon.find_start() else {
        return BTreeSet::new();
    };

    let initial = PlayerState {
        room: start.id,
        keys: collect_item(dungeon, start.id, 0),
        switch_on: false,
    };

    bfs_reach(initial, |state| successors(dungeon, state))
        .map(|state| state.room)
        .collect()
}

/// Whether a player can reach the goal room, or the boss room when the
/// dungeon has no goal.
pub fn is_completable(dungeon: &Dungeon) -> bool {
    let Some(target) = dungeon.find_goal().or_else(|| dungeon.find_boss()) else {
        return false;
    };
    reachable_rooms(dungeon).contains(&target.id)
}

/// Whether every room in the dungeon can be reached from the entrance.
pub fn all_rooms_reachable(dungeon: &Dungeon) -> bool {
    reachable_rooms(dungeon).len() == dungeon.room_count()
}

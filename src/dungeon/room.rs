//! # Rooms and Edges
//!
//! Nodes of the dungeon graph. Rooms refer to each other only by id; the
//! [`Dungeon`](super::Dungeon) arena owns every room.

use super::Coord;
use crate::puzzle::{Condition, Symbol};
use crate::{LockworkError, LockworkResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Dense, non-negative room identifier assigned by the constraints provider.
pub type RoomId = usize;

/// A directed door from its owning room to `target`.
///
/// An edge with no symbol is unconditional. Otherwise the player must hold
/// the symbol (or have the switch in the matching state) to pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub target: RoomId,
    pub symbol: Option<Symbol>,
}

impl Edge {
    pub fn new(target: RoomId, symbol: Option<Symbol>) -> Self {
        Self { target, symbol }
    }

    /// Whether passing through this edge requires a symbol.
    pub fn has_symbol(&self) -> bool {
        self.symbol.is_some()
    }
}

/// An individual space within the dungeon.
///
/// A room holds an optional item the player may collect, an intensity
/// (relative difficulty, 0.0 to 1.0 once generation finishes), its
/// precondition, one edge per linked neighbour, and its place in the spanning
/// tree recorded while rooms were placed.
///
/// # Examples
///
/// ```
/// use lockwork::{Condition, Coord, Room, Symbol};
///
/// let room = Room::new(3, vec![Coord::new(0, 0), Coord::new(2, 0)], None, None, Condition::empty())?;
/// assert_eq!(room.center(), Coord::new(1, 0));
/// assert!(room.parent().is_none());
/// # Ok::<(), lockwork::LockworkError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Identifier used as the arena index
    pub id: RoomId,
    /// Item contained in the room, if any
    pub item: Option<Symbol>,
    /// Relative difficulty of the room
    pub intensity: f64,
    /// What a player must hold to enter the room
    pub precond: Condition,
    coords: Vec<Coord>,
    center: Coord,
    edges: Vec<Edge>,
    parent: Option<RoomId>,
    children: Vec<RoomId>,
}

impl Room {
    /// Creates a room occupying the given coordinates.
    ///
    /// Duplicate coordinates are collapsed. Fails if no coordinates are given.
    pub fn new(
        id: RoomId,
        coords: impl IntoIterator<Item = Coord>,
        parent: Option<RoomId>,
        item: Option<Symbol>,
        precond: Condition,
    ) -> LockworkResult<Self> {
        let coords: Vec<Coord> = coords.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
        let center = Coord::centroid(&coords).ok_or_else(|| {
            LockworkError::InvalidRoom(format!("Room {} has no coordinates", id))
        })?;

        Ok(Self {
            id,
            item,
            intensity: 0.0,
            precond,
            coords,
            center,
            edges: Vec::new(),
            parent,
            children: Vec::new(),
        })
    }

    /// Gets the coordinates the room occupies, in sorted order.
    pub fn coords(&self) -> &[Coord] {
        &self.coords
    }

    /// Gets the integer centroid of the room's coordinates.
    pub fn center(&self) -> Coord {
        self.center
    }

    /// Gets the room's outgoing edges in the order they were created.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Gets the edge leading to `target`, if one exists.
    pub fn edge(&self, target: RoomId) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.target == target)
    }

    /// Creates the edge to `target`, or replaces the symbol of the existing one.
    pub fn set_edge(&mut self, target: RoomId, symbol: Option<Symbol>) {
        match self.edges.iter_mut().find(|edge| edge.target == target) {
            Some(edge) => edge.symbol = symbol,
            None => self.edges.push(Edge::new(target, symbol)),
        }
    }

    /// Gets the number of rooms this room has an edge to.
    pub fn link_count(&self) -> usize {
        self.edges.len()
    }

    /// Gets the room's parent in the spanning tree.
    pub fn parent(&self) -> Option<RoomId> {
        self.parent
    }

    /// Gets the room's children in the spanning tree.
    pub fn children(&self) -> &[RoomId] {
        &self.children
    }

    /// Registers `child` as a child of this room.
    ///
    /// Does not touch the child's parent reference.
    pub fn add_child(&mut self, child: RoomId) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    pub fn is_start(&self) -> bool {
        self.item.is_some_and(Symbol::is_start)
    }

    pub fn is_goal(&self) -> bool {
        self.item.is_some_and(Symbol::is_goal)
    }

    pub fn is_boss(&self) -> bool {
        self.item.is_some_and(Symbol::is_boss)
    }

    pub fn is_switch(&self) -> bool {
        self.item.is_some_and(Symbol::is_switch)
    }
}

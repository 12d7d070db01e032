//! # Symbols
//!
//! Atomic identifiers for keys, locks and the special room markers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single key or lock within the lock-and-key puzzle.
///
/// Each symbol wraps an integer value and two symbols are interchangeable iff
/// their values are equal. Non-negative values are ordinary keys (key 0,
/// key 1, ...). Negative values are reserved for the special markers:
///
/// - `Start`, `Goal` and `Boss` only mark rooms for the consumer of the
///   finished dungeon and take no part in the puzzle itself.
/// - `SwitchOn` and `SwitchOff` never appear in rooms, only in conditions and
///   on edges.
/// - `Switch` is the item placed in the switch room. Picking it up does not
///   grant a symbol; it lets the player flip between `SwitchOn` and
///   `SwitchOff`.
///
/// # Examples
///
/// ```
/// use lockwork::Symbol;
///
/// let key = Symbol::key(2);
/// assert!(key.is_key());
/// assert_eq!(key.to_string(), "C");
/// assert_eq!(Symbol::boss().to_string(), "Boss");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Symbol {
    value: i32,
}

/// Decoded view of a [`Symbol`] value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// An ordinary key with its index
    Key(u32),
    /// Entrance marker
    Start,
    /// Goal marker
    Goal,
    /// Boss marker
    Boss,
    /// Edge/condition requirement: switch must be on
    SwitchOn,
    /// Edge/condition requirement: switch must be off
    SwitchOff,
    /// The switch item itself
    Switch,
}

impl Symbol {
    pub const START: i32 = -1;
    pub const GOAL: i32 = -2;
    pub const BOSS: i32 = -3;
    pub const SWITCH_ON: i32 = -4;
    pub const SWITCH_OFF: i32 = -5;
    pub const SWITCH: i32 = -6;

    /// Creates the symbol for the key with the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index` exceeds `i32::MAX`. Use [`Symbol::try_key`] for
    /// untrusted indices.
    pub fn key(index: u32) -> Self {
        match Self::try_key(index) {
            Some(symbol) => symbol,
            None => panic!("key index {} does not fit a symbol", index),
        }
    }

    /// Creates the symbol for the key with the given index, or `None` if the
    /// index would collide with the marker values.
    pub fn try_key(index: u32) -> Option<Self> {
        i32::try_from(index).ok().map(|value| Self { value })
    }

    pub fn start() -> Self {
        Self { value: Self::START }
    }

    pub fn goal() -> Self {
        Self { value: Self::GOAL }
    }

    pub fn boss() -> Self {
        Self { value: Self::BOSS }
    }

    pub fn switch_on() -> Self {
        Self {
            value: Self::SWITCH_ON,
        }
    }

    pub fn switch_off() -> Self {
        Self {
            value: Self::SWITCH_OFF,
        }
    }

    pub fn switch() -> Self {
        Self {
            value: Self::SWITCH,
        }
    }

    /// Creates a symbol from a raw value, rejecting unknown negative values.
    pub fn from_value(value: i32) -> Option<Self> {
        if value >= Self::SWITCH {
            Some(Self { value })
        } else {
            None
        }
    }

    /// Gets the raw value of the symbol.
    pub fn value(self) -> i32 {
        self.value
    }

    /// Decodes the symbol value.
    pub fn kind(self) -> SymbolKind {
        match self.value {
            Self::START => SymbolKind::Start,
            Self::GOAL => SymbolKind::Goal,
            Self::BOSS => SymbolKind::Boss,
            Self::SWITCH_ON => SymbolKind::SwitchOn,
            Self::SWITCH_OFF => SymbolKind::SwitchOff,
            Self::SWITCH => SymbolKind::Switch,
            v => SymbolKind::Key(v as u32),
        }
    }

    /// Gets the key index if this is an ordinary key.
    pub fn key_index(self) -> Option<u32> {
        match self.kind() {
            SymbolKind::Key(index) => Some(index),
            _ => None,
        }
    }

    pub fn is_key(self) -> bool {
        self.value >= 0
    }

    pub fn is_start(self) -> bool {
        self.value == Self::START
    }

    pub fn is_goal(self) -> bool {
        self.value == Self::GOAL
    }

    pub fn is_boss(self) -> bool {
        self.value == Self::BOSS
    }

    /// Whether this is the switch item (not one of the switch states).
    pub fn is_switch(self) -> bool {
        self.value == Self::SWITCH
    }

    /// Whether this is `SwitchOn` or `SwitchOff`.
    pub fn is_switch_state(self) -> bool {
        self.value == Self::SWITCH_ON || self.value == Self::SWITCH_OFF
    }
}

impl TryFrom<i32> for Symbol {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Symbol::from_value(value).ok_or_else(|| format!("unknown symbol value {}", value))
    }
}

impl From<Symbol> for i32 {
    fn from(symbol: Symbol) -> i32 {
        symbol.value
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            SymbolKind::Start => write!(f, "Start"),
            SymbolKind::Goal => write!(f, "Goal"),
            SymbolKind::Boss => write!(f, "Boss"),
            SymbolKind::SwitchOn => write!(f, "ON"),
            SymbolKind::SwitchOff => write!(f, "OFF"),
            SymbolKind::Switch => write!(f, "SW"),
            SymbolKind::Key(index) if index < 26 => {
                write!(f, "{}", char::from(b'A' + index as u8))
            }
            SymbolKind::Key(index) => write!(f, "{}", index),
        }
    }
}

//! # Preconditions
//!
//! The set of symbols a player must hold to enter a room, stored as a key
//! bitset plus a single switch requirement.

use super::Symbol;
use crate::config::MAX_KEYS;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The state the dungeon's switch must be in.
///
/// `Either` means the condition places no requirement on the switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SwitchState {
    #[default]
    Either,
    On,
    Off,
}

impl SwitchState {
    /// Gets the symbol a condition or edge uses to require this state.
    pub fn to_symbol(self) -> Option<Symbol> {
        match self {
            SwitchState::Either => None,
            SwitchState::On => Some(Symbol::switch_on()),
            SwitchState::Off => Some(Symbol::switch_off()),
        }
    }

    /// Swaps `On` and `Off`; `Either` stays as it is.
    pub fn invert(self) -> Self {
        match self {
            SwitchState::Either => SwitchState::Either,
            SwitchState::On => SwitchState::Off,
            SwitchState::Off => SwitchState::On,
        }
    }
}

/// An immutable precondition: the keys a player must hold and the state the
/// switch must be in.
///
/// Conditions form a partial order under [`Condition::implies`]. Adding a
/// symbol with [`Condition::and`] returns a new condition and never mutates
/// the receiver.
///
/// # Examples
///
/// ```
/// use lockwork::{Condition, Symbol};
///
/// let open = Condition::empty();
/// let locked = open.and(Symbol::key(0));
///
/// assert!(locked.implies(&open));
/// assert!(!open.implies(&locked));
/// assert_eq!(locked.key_level(), 1);
/// assert_eq!(open.single_symbol_difference(&locked), Some(Symbol::key(0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Condition {
    keys: u64,
    switch_state: SwitchState,
}

impl Condition {
    /// The condition that every player satisfies.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a condition requiring only the given symbol.
    pub fn from_symbol(symbol: Symbol) -> Self {
        Self::empty().and(symbol)
    }

    /// Creates a condition requiring only the given switch state.
    pub fn with_switch(state: SwitchState) -> Self {
        Self {
            keys: 0,
            switch_state: state,
        }
    }

    /// Returns a new condition that additionally requires `symbol`.
    ///
    /// Keys are added to the key set and switch states replace the switch
    /// requirement. Room markers (start, goal, boss, switch item) are not
    /// requirements and leave the condition unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `symbol` is a key with index `MAX_KEYS` or above. Use
    /// [`Condition::checked_and`] when the index is not known to be in range.
    pub fn and(&self, symbol: Symbol) -> Self {
        match self.checked_and(symbol) {
            Some(result) => result,
            None => panic!("key {} exceeds the {}-key limit", symbol, MAX_KEYS),
        }
    }

    /// Like [`Condition::and`], but returns `None` for a key the bitset cannot
    /// hold.
    pub fn checked_and(&self, symbol: Symbol) -> Option<Self> {
        let mut result = *self;
        if let Some(index) = symbol.key_index() {
            if index as usize >= MAX_KEYS {
                return None;
            }
            result.keys |= 1u64 << index;
        } else if symbol.value() == Symbol::SWITCH_ON {
            debug_assert!(self.switch_state != SwitchState::Off);
            result.switch_state = SwitchState::On;
        } else if symbol.value() == Symbol::SWITCH_OFF {
            debug_assert!(self.switch_state != SwitchState::On);
            result.switch_state = SwitchState::Off;
        }
        Some(result)
    }

    /// Returns the union of both conditions' requirements.
    ///
    /// A definite switch requirement in `other` overrides this one's.
    pub fn and_condition(&self, other: &Condition) -> Self {
        Self {
            keys: self.keys | other.keys,
            switch_state: match other.switch_state {
                SwitchState::Either => self.switch_state,
                state => state,
            },
        }
    }

    /// Whether satisfying this condition also satisfies `other`, i.e. this
    /// condition's symbol set is a superset of `other`'s.
    pub fn implies(&self, other: &Condition) -> bool {
        self.keys & other.keys == other.keys
            && (other.switch_state == SwitchState::Either
                || self.switch_state == other.switch_state)
    }

    /// Gets the symbol by which the two conditions differ, if they differ by
    /// exactly one symbol.
    ///
    /// The result is the same regardless of argument order.
    pub fn single_symbol_difference(&self, other: &Condition) -> Option<Symbol> {
        let key_difference = self.keys ^ other.keys;

        let switch_difference = match (self.switch_state, other.switch_state) {
            (a, b) if a == b => None,
            (SwitchState::Either, state) | (state, SwitchState::Either) => state.to_symbol(),
            // On versus Off differs by two symbols
            _ => return None,
        };

        match (key_difference.count_ones(), switch_difference) {
            (1, None) => Some(Symbol::key(key_difference.trailing_zeros())),
            (0, Some(symbol)) => Some(symbol),
            _ => None,
        }
    }

    /// Number of ordinary keys this condition requires.
    pub fn key_level(&self) -> usize {
        self.keys.count_ones() as usize
    }

    pub fn switch_state(&self) -> SwitchState {
        self.switch_state
    }

    /// Whether the condition requires the given symbol.
    pub fn contains(&self, symbol: Symbol) -> bool {
        match symbol.key_index() {
            Some(index) => (index as usize) < MAX_KEYS && self.keys & (1u64 << index) != 0,
            None => self.switch_state.to_symbol() == Some(symbol),
        }
    }

    /// Lists every required symbol, keys first in ascending order.
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut symbols: Vec<Symbol> = (0..MAX_KEYS as u32)
            .filter(|&index| self.keys & (1u64 << index) != 0)
            .map(Symbol::key)
            .collect();
        symbols.extend(self.switch_state.to_symbol());
        symbols
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.symbols().iter().map(Symbol::to_string).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

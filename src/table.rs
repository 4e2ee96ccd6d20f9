//! This module defines the `TransitionTable`, the immutable mapping from
//! `(state, read symbol)` to the `Transition` applied in that situation.

use crate::types::{StateId, Transition};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The transition function of a machine.
///
/// Rows are keyed by state and columns by read symbol. A lookup miss is an expected outcome:
/// it means the transition is undefined and the machine rejects. The table has no mutating
/// methods once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionTable {
    rows: HashMap<StateId, HashMap<char, Transition>>,
}

impl TransitionTable {
    /// Creates a table without any transitions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the transition for `state` reading `symbol`, if one is defined.
    pub fn lookup(&self, state: &StateId, symbol: char) -> Option<&Transition> {
        self.rows.get(state)?.get(&symbol)
    }

    /// Returns `true` if at least one transition leaves `state`.
    pub fn contains_state(&self, state: &StateId) -> bool {
        self.rows.get(state).is_some_and(|row| !row.is_empty())
    }

    /// Iterates over the states that have a row in the table.
    pub fn states(&self) -> impl Iterator<Item = &StateId> {
        self.rows.keys()
    }

    /// Iterates over every `(state, symbol, transition)` entry.
    pub fn iter(&self) -> impl Iterator<Item = (&StateId, char, &Transition)> {
        self.rows.iter().flat_map(|(state, row)| {
            row.iter()
                .map(move |(&symbol, transition)| (state, symbol, transition))
        })
    }

    /// Returns the number of defined transitions.
    pub fn len(&self) -> usize {
        self.rows.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<HashMap<StateId, HashMap<char, Transition>>> for TransitionTable {
    fn from(rows: HashMap<StateId, HashMap<char, Transition>>) -> Self {
        Self { rows }
    }
}

impl FromIterator<((StateId, char), Transition)> for TransitionTable {
    /// Builds a table from keyed transitions. A later entry for the same key replaces an
    /// earlier one.
    fn from_iter<I: IntoIterator<Item = ((StateId, char), Transition)>>(entries: I) -> Self {
        let mut rows: HashMap<StateId, HashMap<char, Transition>> = HashMap::new();
        for ((state, symbol), transition) in entries {
            rows.entry(state).or_default().insert(symbol, transition);
        }
        Self { rows }
    }
}

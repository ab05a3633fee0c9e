//! Immutable state snapshots: the nodes of the reachability graph.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::values::ValueId;

/// The values of one quantity inside a [`State`].
///
/// `second` is `None` for quantities that do not model their second
/// derivative, so two states differing only in an unmodelled slot are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StateEntry {
    pub name: String,
    pub magnitude: ValueId,
    pub derivative: ValueId,
    pub second: Option<ValueId>,
}

/// A frozen snapshot of every quantity's values at one point in the search.
///
/// Entries are kept in model order, so equality is a plain entry-wise
/// comparison; two snapshots of the same model are equal iff all triples
/// match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct State {
    entries: Vec<StateEntry>,
}

impl State {
    pub fn new(entries: Vec<StateEntry>) -> Self {
        State { entries }
    }

    pub fn entries(&self) -> &[StateEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&StateEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn magnitude(&self, name: &str) -> Option<ValueId> {
        self.get(name).map(|e| e.magnitude)
    }

    pub fn derivative(&self, name: &str) -> Option<ValueId> {
        self.get(name).map(|e| e.derivative)
    }

    pub fn second(&self, name: &str) -> Option<ValueId> {
        self.get(name).and_then(|e| e.second)
    }
}

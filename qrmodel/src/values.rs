//! Symbolic values and the landmark registry.
//!
//! Every magnitude, derivative, and second derivative in a model is drawn from
//! an ordered space of symbolic values. A value is either a *landmark* (a
//! distinguished point such as `zero` or `max`) or an *interval* lying between
//! two landmarks. The [`ValueTable`] records which names are landmarks; it is
//! built once per model and never mutated after a search starts.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ModelError;

/// Handle to an interned symbolic value inside a [`ValueTable`].
///
/// The well-known sign values are pre-interned at fixed ids so that sign
/// arithmetic (comparisons, inversion) never needs a table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValueId(pub(crate) u32);

impl ValueId {
    /// The `zero` landmark, shared by every derivative space.
    pub const ZERO: ValueId = ValueId(0);
    /// The `negative` interval.
    pub const NEGATIVE: ValueId = ValueId(1);
    /// The `positive` interval.
    pub const POSITIVE: ValueId = ValueId(2);
    /// The `max` landmark.
    pub const MAX: ValueId = ValueId(3);
    /// The `min` landmark.
    pub const MIN: ValueId = ValueId(4);

    /// Whether this is one of the three sign values (`negative`/`zero`/`positive`).
    pub fn is_sign(self) -> bool {
        matches!(self, ValueId::ZERO | ValueId::NEGATIVE | ValueId::POSITIVE)
    }
}

/// Registry of symbolic values and their landmark property.
///
/// This replaces the process-wide landmark table of older qualitative
/// reasoners with an explicit, model-owned structure: once the owning
/// [`Model`](crate::Model) is built the table is only read.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValueTable {
    entries: Vec<ValueEntry>,
    index: HashMap<String, ValueId>,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct ValueEntry {
    name: String,
    landmark: bool,
}

impl ValueTable {
    /// Create a table pre-populated with the builtin sign and extremum values.
    pub fn new() -> Self {
        let mut table = ValueTable {
            entries: Vec::new(),
            index: HashMap::new(),
        };
        // Order must match the `ValueId` constants above.
        for (name, landmark) in [
            ("zero", true),
            ("negative", false),
            ("positive", false),
            ("max", true),
            ("min", true),
        ] {
            table.push(name, landmark);
        }
        table
    }

    fn push(&mut self, name: &str, landmark: bool) -> ValueId {
        let id = ValueId(self.entries.len() as u32);
        self.entries.push(ValueEntry {
            name: name.to_owned(),
            landmark,
        });
        self.index.insert(name.to_owned(), id);
        id
    }

    /// Intern a named value, returning the existing id when the name is
    /// already present. Re-interning with a different landmark flag is a
    /// model-construction error.
    pub fn intern(&mut self, name: &str, landmark: bool) -> Result<ValueId, ModelError> {
        if let Some(&id) = self.index.get(name) {
            if self.entries[id.0 as usize].landmark != landmark {
                return Err(ModelError::LandmarkMismatch {
                    name: name.to_owned(),
                });
            }
            return Ok(id);
        }
        Ok(self.push(name, landmark))
    }

    /// Look up a value by name without interning.
    pub fn get(&self, name: &str) -> Option<ValueId> {
        self.index.get(name).copied()
    }

    pub fn name(&self, id: ValueId) -> &str {
        &self.entries[id.0 as usize].name
    }

    pub fn is_landmark(&self, id: ValueId) -> bool {
        self.entries[id.0 as usize].landmark
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Invert a sign value (`positive` ↔ `negative`, `zero` unchanged).
    ///
    /// Inverting anything that is not a sign indicates a malformed relation
    /// and is reported as a diagnostic; the input is returned unchanged so
    /// the search can proceed.
    pub fn invert(&self, id: ValueId) -> ValueId {
        match id {
            ValueId::ZERO => ValueId::ZERO,
            ValueId::POSITIVE => ValueId::NEGATIVE,
            ValueId::NEGATIVE => ValueId::POSITIVE,
            other => {
                log::warn!("cannot invert non-sign value '{}'", self.name(other));
                other
            }
        }
    }
}

impl Default for ValueTable {
    fn default() -> Self {
        ValueTable::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_fixed() {
        let table = ValueTable::new();
        assert_eq!(table.get("zero"), Some(ValueId::ZERO));
        assert_eq!(table.get("positive"), Some(ValueId::POSITIVE));
        assert_eq!(table.get("max"), Some(ValueId::MAX));
        assert!(table.is_landmark(ValueId::ZERO));
        assert!(table.is_landmark(ValueId::MAX));
        assert!(!table.is_landmark(ValueId::POSITIVE));
        assert!(!table.is_landmark(ValueId::NEGATIVE));
    }

    #[test]
    fn intern_is_idempotent() {
        let mut table = ValueTable::new();
        let a = table.intern("half", true).unwrap();
        let b = table.intern("half", true).unwrap();
        assert_eq!(a, b);
        assert_eq!(table.name(a), "half");
    }

    #[test]
    fn intern_rejects_landmark_mismatch() {
        let mut table = ValueTable::new();
        table.intern("half", true).unwrap();
        assert!(table.intern("half", false).is_err());
    }

    #[test]
    fn invert_signs() {
        let table = ValueTable::new();
        assert_eq!(table.invert(ValueId::POSITIVE), ValueId::NEGATIVE);
        assert_eq!(table.invert(ValueId::NEGATIVE), ValueId::POSITIVE);
        assert_eq!(table.invert(ValueId::ZERO), ValueId::ZERO);
    }
}

//! Ordered value spaces.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::values::ValueId;

/// An ordered sequence of symbolic values, landmarks and intervals
/// alternating, from which one slot of a quantity draws its value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Space {
    values: Vec<ValueId>,
}

impl Space {
    pub fn new(values: Vec<ValueId>) -> Self {
        Space { values }
    }

    /// The standard sign space `[negative, zero, positive]` used by
    /// derivative and second-derivative slots.
    pub fn signs() -> Self {
        Space::new(vec![ValueId::NEGATIVE, ValueId::ZERO, ValueId::POSITIVE])
    }

    /// Position of a value within the space, if it belongs to it.
    pub fn position(&self, value: ValueId) -> Option<usize> {
        self.values.iter().position(|&v| v == value)
    }

    pub fn contains(&self, value: ValueId) -> bool {
        self.position(value).is_some()
    }

    pub fn get(&self, index: usize) -> Option<ValueId> {
        self.values.get(index).copied()
    }

    pub fn first(&self) -> Option<ValueId> {
        self.values.first().copied()
    }

    pub fn last(&self) -> Option<ValueId> {
        self.values.last().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ValueId> + '_ {
        self.values.iter().copied()
    }

    /// The value one step away from `from` in the direction of `sign`
    /// (`positive` steps up, `negative` steps down). `None` when `from` is
    /// not in the space, the sign is `zero`, or the step leaves the space.
    pub fn step(&self, from: ValueId, sign: ValueId) -> Option<ValueId> {
        let index = self.position(from)?;
        match sign {
            ValueId::POSITIVE => self.get(index + 1),
            ValueId::NEGATIVE => index.checked_sub(1).and_then(|i| self.get(i)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_respects_bounds() {
        let space = Space::new(vec![ValueId::ZERO, ValueId::POSITIVE, ValueId::MAX]);
        assert_eq!(space.step(ValueId::ZERO, ValueId::POSITIVE), Some(ValueId::POSITIVE));
        assert_eq!(space.step(ValueId::MAX, ValueId::POSITIVE), None);
        assert_eq!(space.step(ValueId::ZERO, ValueId::NEGATIVE), None);
        assert_eq!(space.step(ValueId::MAX, ValueId::NEGATIVE), Some(ValueId::POSITIVE));
        assert_eq!(space.step(ValueId::POSITIVE, ValueId::ZERO), None);
    }
}

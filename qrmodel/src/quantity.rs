//! Quantities: the state variables of a qualitative model.

use enum_map::Enum;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::relation::RelationId;
use crate::space::Space;
use crate::values::ValueId;

/// Index of a quantity within its [`Model`](crate::Model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QuantityId(pub usize);

/// One of the three value slots a quantity carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Slot {
    Magnitude,
    Derivative,
    Second,
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Slot::Magnitude => write!(f, "magnitude"),
            Slot::Derivative => write!(f, "derivative"),
            Slot::Second => write!(f, "second derivative"),
        }
    }
}

/// The (magnitude, derivative, second derivative) values of one quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValueTriple {
    pub magnitude: ValueId,
    pub derivative: ValueId,
    pub second: ValueId,
}

impl ValueTriple {
    /// All three slots at `zero`.
    pub fn zero() -> Self {
        ValueTriple {
            magnitude: ValueId::ZERO,
            derivative: ValueId::ZERO,
            second: ValueId::ZERO,
        }
    }

    pub fn get(&self, slot: Slot) -> ValueId {
        match slot {
            Slot::Magnitude => self.magnitude,
            Slot::Derivative => self.derivative,
            Slot::Second => self.second,
        }
    }

    pub fn set(&mut self, slot: Slot, value: ValueId) {
        match slot {
            Slot::Magnitude => self.magnitude = value,
            Slot::Derivative => self.derivative = value,
            Slot::Second => self.second = value,
        }
    }
}

/// Definition of a single state variable.
///
/// A quantity only describes *what values are possible*: the spaces for each
/// slot, whether the second derivative is modelled at all, and whether the
/// quantity is driven from outside the system. Current values live in the
/// engine's working overlay, never here, so a built model can be shared by
/// any number of searches.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Quantity {
    pub name: String,

    /// Name of the physical entity (tap, container, drain) the quantity
    /// belongs to. Purely descriptive: rendering groups by it, the engine
    /// ignores it.
    pub entity: Option<String>,

    pub magnitude_space: Space,
    pub derivative_space: Space,
    pub second_space: Space,

    /// Quantities that do not track curvature (typically externally driven
    /// inputs) keep their second derivative at `zero`, omit it from state
    /// snapshots, and are skipped by all second-derivative reasoning.
    pub models_second: bool,

    /// Externally driven: the only quantities whose derivative may change
    /// without a causal reason (via exogenous terminations).
    pub exogenous: bool,

    /// Values the quantity starts from in the seed state.
    pub initial: ValueTriple,

    /// Relations that target this quantity, wired at model build time.
    pub(crate) incoming: Vec<RelationId>,
}

impl Quantity {
    /// The space governing `slot`.
    pub fn space(&self, slot: Slot) -> &Space {
        match slot {
            Slot::Magnitude => &self.magnitude_space,
            Slot::Derivative => &self.derivative_space,
            Slot::Second => &self.second_space,
        }
    }

    /// Relations for which this quantity is the target.
    pub fn incoming(&self) -> &[RelationId] {
        &self.incoming
    }
}

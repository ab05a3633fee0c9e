//! Causal relationships between quantities.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::EnumIs;

use crate::quantity::QuantityId;
use crate::values::{ValueId, ValueTable};

/// Index of a relationship within its [`Model`](crate::Model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RelationId(pub usize);

/// The three causal link kinds of the qualitative-physics formalism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RelationKind {
    /// `P`: the source's derivative (and second derivative) sign carries
    /// over to the target's derivative (and second derivative).
    Proportional,
    /// `I`: the source's *magnitude* sign drives the target's derivative,
    /// and the source's derivative drives the target's second derivative.
    Influence,
    /// `VC`: whenever the source magnitude equals its paired value, the
    /// target magnitude must equal the other paired value.
    ValueCorrespondence,
}

/// Polarity of a proportional or influence link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Polarity {
    Positive,
    Negative,
}

/// An immutable causal link from `source` to `target`.
///
/// Relationships are created once by the model builder and never mutated;
/// quantities hold back-references to the relations targeting them.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Relationship {
    pub kind: RelationKind,
    pub polarity: Polarity,
    pub source: QuantityId,
    pub target: QuantityId,
    /// `(source value, target value)` pair for value correspondences.
    pub correspondence: Option<(ValueId, ValueId)>,
}

impl Relationship {
    /// Apply this relation's polarity to a contributed sign value.
    pub fn signed(&self, sign: ValueId, values: &ValueTable) -> ValueId {
        match self.polarity {
            Polarity::Positive => sign,
            Polarity::Negative => values.invert(sign),
        }
    }

    /// Short label of the relation, e.g. `P+`, `I-`, `VC(max, max)`.
    pub fn label(&self, values: &ValueTable) -> String {
        let sign = match self.polarity {
            Polarity::Positive => "+",
            Polarity::Negative => "-",
        };
        match self.kind {
            RelationKind::Proportional => format!("P{sign}"),
            RelationKind::Influence => format!("I{sign}"),
            RelationKind::ValueCorrespondence => match self.correspondence {
                Some((sv, tv)) => {
                    format!("VC({}, {})", values.name(sv), values.name(tv))
                }
                None => "VC(?)".to_owned(),
            },
        }
    }
}

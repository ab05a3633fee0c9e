//! Constraint checking and repair.
//!
//! Validity of a quantity has two parts: the *boundary rule* (no derivative
//! may point outside the magnitude space) and the *causal rule* (derivatives
//! and magnitudes must agree with the influences collected from the
//! relations targeting the quantity). [`WorkingState::settle`] drives both to
//! a fixed point across all quantities, because repairing one quantity can
//! invalidate another.

use smallvec::SmallVec;
use strum::EnumIs;

use qrmodel::{QuantityId, RelationKind, Slot, ValueId};

use crate::working::WorkingState;

/// Everything the relations targeting one quantity demand of it.
#[derive(Debug, Default)]
pub struct Influences {
    /// Magnitude values required by active value correspondences.
    pub magnitude_constraints: SmallVec<[ValueId; 2]>,
    /// Sign contributions to the derivative.
    pub derivative: SmallVec<[ValueId; 4]>,
    /// Sign contributions to the second derivative.
    pub second: SmallVec<[ValueId; 4]>,
}

/// What a list of sign contributions implies for the constrained slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIs)]
pub enum Requirement {
    /// The slot must hold exactly this sign.
    Exactly(ValueId),
    /// Positive and negative contributions are both present: structurally
    /// undetermined, any value is accepted. Resolved by explicit search,
    /// never by the checker.
    Ambiguous,
    /// No relation constrains the slot.
    Unconstrained,
}

/// Collapse sign contributions into a requirement.
pub fn requirement(contributions: &[ValueId]) -> Requirement {
    if contributions.is_empty() {
        return Requirement::Unconstrained;
    }
    let has_positive = contributions.contains(&ValueId::POSITIVE);
    let has_negative = contributions.contains(&ValueId::NEGATIVE);
    match (has_positive, has_negative) {
        (true, true) => Requirement::Ambiguous,
        (true, false) => Requirement::Exactly(ValueId::POSITIVE),
        (false, true) => Requirement::Exactly(ValueId::NEGATIVE),
        (false, false) => Requirement::Exactly(ValueId::ZERO),
    }
}

impl<'m> WorkingState<'m> {
    /// Collect the constraints the relations impose on `q` in the current
    /// working values. Second-derivative contributions are only gathered for
    /// quantities that model their second derivative.
    pub fn influences_on(&self, q: QuantityId) -> Influences {
        let model = self.model();
        let values = model.values();
        let models_second = model.quantity(q).models_second;
        let mut influences = Influences::default();

        for &rid in model.quantity(q).incoming() {
            let relation = model.relation(rid);
            let source = self.triple(relation.source);
            match relation.kind {
                RelationKind::Proportional => {
                    influences
                        .derivative
                        .push(relation.signed(source.derivative, values));
                    if models_second {
                        influences
                            .second
                            .push(relation.signed(source.second, values));
                    }
                }
                RelationKind::Influence => {
                    // A magnitude at `positive` or `max` pushes; anything
                    // else contributes nothing.
                    let push = if source.magnitude == ValueId::POSITIVE
                        || source.magnitude == ValueId::MAX
                    {
                        ValueId::POSITIVE
                    } else {
                        ValueId::ZERO
                    };
                    influences.derivative.push(relation.signed(push, values));
                    if models_second {
                        influences
                            .second
                            .push(relation.signed(source.derivative, values));
                    }
                }
                RelationKind::ValueCorrespondence => {
                    if let Some((source_value, target_value)) = relation.correspondence
                        && source.magnitude == source_value
                    {
                        influences.magnitude_constraints.push(target_value);
                    }
                }
            }
        }
        influences
    }

    pub(crate) fn at_top_landmark(&self, q: QuantityId) -> bool {
        let quantity = self.model().quantity(q);
        let magnitude = self.value(q, Slot::Magnitude);
        quantity.magnitude_space.last() == Some(magnitude)
            && self.model().values().is_landmark(magnitude)
    }

    pub(crate) fn at_bottom_landmark(&self, q: QuantityId) -> bool {
        let quantity = self.model().quantity(q);
        let magnitude = self.value(q, Slot::Magnitude);
        quantity.magnitude_space.first() == Some(magnitude)
            && self.model().values().is_landmark(magnitude)
    }

    /// Boundary rule: no derivative may drive the magnitude past the ends of
    /// its space.
    pub fn boundaries_ok(&self, q: QuantityId) -> bool {
        let triple = self.triple(q);
        if self.at_top_landmark(q)
            && (triple.derivative == ValueId::POSITIVE
                || (triple.derivative == ValueId::ZERO && triple.second == ValueId::POSITIVE))
        {
            return false;
        }
        if self.at_bottom_landmark(q)
            && (triple.derivative == ValueId::NEGATIVE
                || (triple.derivative == ValueId::ZERO && triple.second == ValueId::NEGATIVE))
        {
            return false;
        }
        true
    }

    /// Causal rule: the quantity's values must agree with its influences.
    pub fn causal_ok(&self, q: QuantityId) -> bool {
        let influences = self.influences_on(q);
        let triple = self.triple(q);

        for &constraint in &influences.magnitude_constraints {
            if triple.magnitude != constraint {
                return false;
            }
        }
        if let Requirement::Exactly(sign) = requirement(&influences.derivative)
            && triple.derivative != sign
        {
            return false;
        }
        if let Requirement::Exactly(sign) = requirement(&influences.second)
            && triple.second != sign
        {
            return false;
        }
        true
    }

    pub fn is_valid(&self, q: QuantityId) -> bool {
        self.boundaries_ok(q) && self.causal_ok(q)
    }

    /// Clamp derivatives that point outside the magnitude space to zero.
    /// Fails when the offending slot is already fixed.
    fn repair_boundaries(&mut self, q: QuantityId) -> bool {
        if self.at_top_landmark(q) {
            if self.value(q, Slot::Derivative) == ValueId::POSITIVE {
                if self.is_fixed(q, Slot::Derivative) {
                    return false;
                }
                self.set_fixed(q, Slot::Derivative, ValueId::ZERO);
            }
            if self.value(q, Slot::Second) == ValueId::POSITIVE
                && self.value(q, Slot::Derivative) != ValueId::NEGATIVE
            {
                if self.is_fixed(q, Slot::Second) {
                    return false;
                }
                self.set_fixed(q, Slot::Second, ValueId::ZERO);
            }
        }
        if self.at_bottom_landmark(q) {
            if self.value(q, Slot::Derivative) == ValueId::NEGATIVE {
                if self.is_fixed(q, Slot::Derivative) {
                    return false;
                }
                self.set_fixed(q, Slot::Derivative, ValueId::ZERO);
            }
            if self.value(q, Slot::Second) == ValueId::NEGATIVE
                && self.value(q, Slot::Derivative) != ValueId::POSITIVE
            {
                if self.is_fixed(q, Slot::Second) {
                    return false;
                }
                self.set_fixed(q, Slot::Second, ValueId::ZERO);
            }
        }
        true
    }

    /// Repair causal violations where the fix is unambiguous.
    ///
    /// A violated value correspondence may advance the magnitude by exactly
    /// one step toward the required landmark, and only when the derivative
    /// already points that way; anything else (teleporting two steps, moving
    /// against the trend) fails. A violated sign requirement sets the slot
    /// to the implied sign unless the slot is fixed or already pinned to the
    /// opposite sign.
    fn repair_causal(&mut self, q: QuantityId) -> bool {
        let influences = self.influences_on(q);

        for &constraint in &influences.magnitude_constraints {
            let magnitude = self.value(q, Slot::Magnitude);
            if magnitude == constraint {
                continue;
            }
            if self.is_fixed(q, Slot::Magnitude) {
                return false;
            }
            let space = &self.model().quantity(q).magnitude_space;
            let derivative = self.value(q, Slot::Derivative);
            let toward = match derivative {
                ValueId::POSITIVE | ValueId::NEGATIVE => space.step(magnitude, derivative),
                _ => None,
            };
            if toward == Some(constraint) {
                self.set_fixed(q, Slot::Magnitude, constraint);
            } else {
                return false;
            }
        }

        for (slot, contributions) in [
            (Slot::Derivative, &influences.derivative),
            (Slot::Second, &influences.second),
        ] {
            let Requirement::Exactly(sign) = requirement(contributions) else {
                continue;
            };
            let current = self.value(q, slot);
            if current == sign {
                continue;
            }
            if self.is_fixed(q, slot) {
                return false;
            }
            let opposed = (sign == ValueId::POSITIVE && current == ValueId::NEGATIVE)
                || (sign == ValueId::NEGATIVE && current == ValueId::POSITIVE);
            if opposed {
                return false;
            }
            self.set_fixed(q, slot, sign);
        }
        true
    }

    /// Check-or-repair one quantity. Boundary issues are handled before
    /// causal ones, matching the order violations are introduced in.
    pub fn make_valid(&mut self, q: QuantityId) -> bool {
        if !self.boundaries_ok(q) && !self.repair_boundaries(q) {
            return false;
        }
        if !self.causal_ok(q) && !self.repair_causal(q) {
            return false;
        }
        true
    }

    /// Run repair passes over all quantities until every one is valid, or
    /// until a single repair fails, which marks the whole candidate state
    /// invalid.
    ///
    /// Terminates because every successful repair pins a previously unfixed
    /// slot, and fixed slots cannot be altered again.
    pub fn settle(&mut self) -> bool {
        loop {
            if self.model().quantity_ids().all(|q| self.is_valid(q)) {
                return true;
            }
            for q in self.model().quantity_ids() {
                if !self.make_valid(q) {
                    log::trace!(
                        "repair failed on quantity '{}'",
                        self.model().quantity(q).name
                    );
                    return false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requirement_resolution() {
        assert_eq!(requirement(&[]), Requirement::Unconstrained);
        assert_eq!(
            requirement(&[ValueId::POSITIVE]),
            Requirement::Exactly(ValueId::POSITIVE)
        );
        assert_eq!(
            requirement(&[ValueId::ZERO, ValueId::ZERO]),
            Requirement::Exactly(ValueId::ZERO)
        );
        assert_eq!(
            requirement(&[ValueId::NEGATIVE, ValueId::ZERO]),
            Requirement::Exactly(ValueId::NEGATIVE)
        );
        assert_eq!(
            requirement(&[ValueId::POSITIVE, ValueId::NEGATIVE]),
            Requirement::Ambiguous
        );
    }
}

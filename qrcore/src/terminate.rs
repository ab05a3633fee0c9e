//! Termination generation: the candidate value changes available from a
//! state.
//!
//! Four generators run independently. The epsilon generator produces one
//! mandatory composite (landmark values with a nonzero next-order derivative
//! must move immediately); the value, exogenous and ambiguous generators each
//! produce a list of optional alternatives. The composer in
//! [`compose`](crate::compose) combines them into candidate transitions.

use std::collections::BTreeMap;

use enum_map::EnumMap;
use strum::Display;

use qrmodel::{Model, QuantityId, Slot, State, ValueId};

use crate::check::{Requirement, requirement};
use crate::working::WorkingState;

/// Why a slot change was proposed. Carried for tracing only; the engine
/// never branches on it after generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum TerminationKind {
    Epsilon,
    Value,
    Exogenous,
    Ambiguous,
}

/// One requested slot assignment inside a [`Termination`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotChange {
    pub to: ValueId,
    pub kind: TerminationKind,
}

/// A set of per-quantity slot changes, the unit combined into transitions.
///
/// Slots absent from the map are left unchanged when the termination is
/// applied.
#[derive(Debug, Clone, Default)]
pub struct Termination {
    changes: BTreeMap<QuantityId, EnumMap<Slot, Option<SlotChange>>>,
}

impl Termination {
    pub fn new() -> Self {
        Termination::default()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Request a slot change. Returns false (and leaves the existing entry in
    /// place) when the slot already carries a different target value; a
    /// repeated identical request is accepted.
    pub fn add_change(&mut self, q: QuantityId, slot: Slot, change: SlotChange) -> bool {
        let slots = self.changes.entry(q).or_default();
        match slots[slot] {
            Some(existing) if existing.to != change.to => {
                log::trace!("conflicting change requested for quantity {} {slot}", q.0);
                false
            }
            Some(_) => true,
            None => {
                slots[slot] = Some(change);
                true
            }
        }
    }

    /// Fold another termination into this one, slot by slot. Returns false on
    /// the first conflicting slot; the receiver is then partially merged and
    /// must be discarded.
    pub fn merge(&mut self, other: &Termination) -> bool {
        for (q, slot, change) in other.iter() {
            if !self.add_change(q, slot, *change) {
                return false;
            }
        }
        true
    }

    /// All requested changes, ordered by quantity then slot.
    pub fn iter(&self) -> impl Iterator<Item = (QuantityId, Slot, &SlotChange)> {
        self.changes.iter().flat_map(|(&q, slots)| {
            slots
                .iter()
                .filter_map(move |(slot, change)| change.as_ref().map(|c| (q, slot, c)))
        })
    }

    /// Human-readable rendering against the state the termination fires from,
    /// e.g. `Inflow derivative: zero -> positive [exogenous]`.
    pub fn describe(&self, model: &Model, before: &State) -> String {
        let values = model.values();
        let parts: Vec<String> = self
            .iter()
            .map(|(q, slot, change)| {
                let quantity = model.quantity(q);
                let from = before
                    .get(&quantity.name)
                    .and_then(|entry| match slot {
                        Slot::Magnitude => Some(entry.magnitude),
                        Slot::Derivative => Some(entry.derivative),
                        Slot::Second => entry.second,
                    })
                    .map_or("?", |v| values.name(v));
                format!(
                    "{} {slot}: {from} -> {} [{}]",
                    quantity.name,
                    values.name(change.to),
                    change.kind
                )
            })
            .collect();
        if parts.is_empty() {
            "no change".to_owned()
        } else {
            parts.join(", ")
        }
    }
}

/// The mandatory epsilon composite: every landmark magnitude with a nonzero
/// derivative steps off the landmark, and every landmark derivative with a
/// nonzero second derivative does the same. A step that would leave the
/// space indicates a malformed model; it is logged and dropped rather than
/// aborting the search.
pub fn epsilon_termination(ws: &WorkingState<'_>) -> Termination {
    let model = ws.model();
    let values = model.values();
    let mut out = Termination::new();

    for q in model.quantity_ids() {
        let quantity = model.quantity(q);
        let triple = ws.triple(q);

        if values.is_landmark(triple.magnitude) && triple.derivative != ValueId::ZERO {
            match quantity.magnitude_space.step(triple.magnitude, triple.derivative) {
                Some(next) => {
                    out.add_change(
                        q,
                        Slot::Magnitude,
                        SlotChange {
                            to: next,
                            kind: TerminationKind::Epsilon,
                        },
                    );
                }
                None => log::warn!(
                    "'{}' is driven past the end of its magnitude space; \
                     the model is missing a containment relation",
                    quantity.name
                ),
            }
        }

        if values.is_landmark(triple.derivative) && triple.second != ValueId::ZERO {
            match quantity.derivative_space.step(triple.derivative, triple.second) {
                Some(next) => {
                    out.add_change(
                        q,
                        Slot::Derivative,
                        SlotChange {
                            to: next,
                            kind: TerminationKind::Epsilon,
                        },
                    );
                }
                None => log::warn!(
                    "'{}' is driven past the end of its derivative space",
                    quantity.name
                ),
            }
        }
    }
    out
}

/// Optional interval-to-adjacent steps: an interval magnitude with a nonzero
/// derivative may (but need not) reach the next entry, and likewise for an
/// interval derivative with a nonzero second derivative. Steps that would
/// leave the space are simply not proposed.
pub fn value_terminations(ws: &WorkingState<'_>) -> Vec<Termination> {
    let model = ws.model();
    let values = model.values();
    let mut out = Vec::new();

    for q in model.quantity_ids() {
        let quantity = model.quantity(q);
        let triple = ws.triple(q);

        if !values.is_landmark(triple.magnitude)
            && triple.derivative != ValueId::ZERO
            && let Some(next) = quantity.magnitude_space.step(triple.magnitude, triple.derivative)
        {
            let mut t = Termination::new();
            t.add_change(
                q,
                Slot::Magnitude,
                SlotChange {
                    to: next,
                    kind: TerminationKind::Value,
                },
            );
            out.push(t);
        }

        if !values.is_landmark(triple.derivative)
            && triple.second != ValueId::ZERO
            && let Some(next) = quantity.derivative_space.step(triple.derivative, triple.second)
        {
            let mut t = Termination::new();
            t.add_change(
                q,
                Slot::Derivative,
                SlotChange {
                    to: next,
                    kind: TerminationKind::Value,
                },
            );
            out.push(t);
        }
    }
    out
}

/// Optional derivative moves for externally driven quantities: a nonzero
/// derivative may reset to zero; a zero derivative may start rising or
/// falling, except toward a boundary the magnitude already sits on.
pub fn exogenous_terminations(ws: &WorkingState<'_>) -> Vec<Termination> {
    let model = ws.model();
    let mut out = Vec::new();

    for q in model.quantity_ids() {
        let quantity = model.quantity(q);
        if !quantity.exogenous {
            continue;
        }
        let triple = ws.triple(q);

        let mut propose = |to: ValueId| {
            let mut t = Termination::new();
            t.add_change(
                q,
                Slot::Derivative,
                SlotChange {
                    to,
                    kind: TerminationKind::Exogenous,
                },
            );
            out.push(t);
        };

        if triple.derivative != ValueId::ZERO {
            propose(ValueId::ZERO);
        } else {
            if !ws.at_top_landmark(q) {
                propose(ValueId::POSITIVE);
            }
            if !ws.at_bottom_landmark(q) {
                propose(ValueId::NEGATIVE);
            }
        }
    }
    out
}

/// Optional resolutions of structurally undetermined second derivatives: when
/// a quantity receives both positive and negative second-derivative
/// contributions, a nonzero second may reset to zero, and a zero second may
/// take either sign.
pub fn ambiguous_terminations(ws: &WorkingState<'_>) -> Vec<Termination> {
    let model = ws.model();
    let mut out = Vec::new();

    for q in model.quantity_ids() {
        if requirement(&ws.influences_on(q).second) != Requirement::Ambiguous {
            continue;
        }
        let second = ws.value(q, Slot::Second);

        let mut propose = |to: ValueId| {
            let mut t = Termination::new();
            t.add_change(
                q,
                Slot::Second,
                SlotChange {
                    to,
                    kind: TerminationKind::Ambiguous,
                },
            );
            out.push(t);
        };

        if second != ValueId::ZERO {
            propose(ValueId::ZERO);
        } else {
            propose(ValueId::POSITIVE);
            propose(ValueId::NEGATIVE);
        }
    }
    out
}

/// Run all four generators, returning the mandatory epsilon composite and
/// the optional alternatives in a stable order.
pub fn generate(ws: &WorkingState<'_>) -> (Termination, Vec<Termination>) {
    let epsilon = epsilon_termination(ws);
    let mut optional = value_terminations(ws);
    optional.extend(exogenous_terminations(ws));
    optional.extend(ambiguous_terminations(ws));
    (epsilon, optional)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(to: ValueId, kind: TerminationKind) -> SlotChange {
        SlotChange { to, kind }
    }

    #[test]
    fn merge_is_commutative_for_compatible_pairs() {
        let q0 = QuantityId(0);
        let q1 = QuantityId(1);
        let mut a = Termination::new();
        a.add_change(q0, Slot::Magnitude, change(ValueId::POSITIVE, TerminationKind::Epsilon));
        let mut b = Termination::new();
        b.add_change(q1, Slot::Derivative, change(ValueId::NEGATIVE, TerminationKind::Value));
        b.add_change(q0, Slot::Magnitude, change(ValueId::POSITIVE, TerminationKind::Value));

        let mut ab = Termination::new();
        assert!(ab.merge(&a));
        assert!(ab.merge(&b));
        let mut ba = Termination::new();
        assert!(ba.merge(&b));
        assert!(ba.merge(&a));

        let collect = |t: &Termination| {
            t.iter().map(|(q, s, c)| (q, s, c.to)).collect::<Vec<_>>()
        };
        assert_eq!(collect(&ab), collect(&ba));
    }

    #[test]
    fn merge_rejects_conflicting_slot() {
        let q = QuantityId(0);
        let mut a = Termination::new();
        a.add_change(q, Slot::Derivative, change(ValueId::POSITIVE, TerminationKind::Exogenous));
        let mut b = Termination::new();
        b.add_change(q, Slot::Derivative, change(ValueId::NEGATIVE, TerminationKind::Exogenous));
        assert!(!a.merge(&b));
    }

    #[test]
    fn repeated_identical_change_is_accepted() {
        let q = QuantityId(0);
        let mut t = Termination::new();
        assert!(t.add_change(q, Slot::Second, change(ValueId::ZERO, TerminationKind::Ambiguous)));
        assert!(t.add_change(q, Slot::Second, change(ValueId::ZERO, TerminationKind::Ambiguous)));
        assert_eq!(t.iter().count(), 1);
    }
}

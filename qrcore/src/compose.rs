//! Transition composition: every subset of the optional terminations merged
//! onto the mandatory epsilon composite.

use crate::terminate::Termination;

/// Enumerate all `2^n` subsets of the optional terminations as a bit pattern
/// and merge each selected subset, in list order, onto a copy of the epsilon
/// composite. A subset whose merge conflicts is discarded. The empty subset
/// is included, so the pure epsilon transition is always a candidate.
///
/// No deduplication happens here; distinct composites may still settle into
/// the same state, which the graph builder deduplicates.
pub fn compose(epsilon: &Termination, optional: &[Termination]) -> Vec<Termination> {
    let n = optional.len();
    assert!(n < 64, "optional termination count exceeds subset mask width");

    let mut candidates = Vec::new();
    'subset: for mask in 0u64..(1u64 << n) {
        let mut composite = epsilon.clone();
        for (i, termination) in optional.iter().enumerate() {
            if mask & (1 << i) != 0 && !composite.merge(termination) {
                log::trace!("discarding conflicting composite subset {mask:#b}");
                continue 'subset;
            }
        }
        candidates.push(composite);
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminate::{SlotChange, TerminationKind};
    use qrmodel::{QuantityId, Slot, ValueId};

    fn single(q: usize, slot: Slot, to: ValueId) -> Termination {
        let mut t = Termination::new();
        t.add_change(
            QuantityId(q),
            slot,
            SlotChange {
                to,
                kind: TerminationKind::Value,
            },
        );
        t
    }

    #[test]
    fn composes_all_compatible_subsets() {
        let epsilon = Termination::new();
        let optional = [
            single(0, Slot::Magnitude, ValueId::POSITIVE),
            single(1, Slot::Derivative, ValueId::NEGATIVE),
        ];
        // {}, {a}, {b}, {a, b}
        assert_eq!(compose(&epsilon, &optional).len(), 4);
    }

    #[test]
    fn discards_conflicting_subsets() {
        let epsilon = single(0, Slot::Derivative, ValueId::POSITIVE);
        let optional = [single(0, Slot::Derivative, ValueId::NEGATIVE)];
        let candidates = compose(&epsilon, &optional);
        // only the empty subset survives
        assert_eq!(candidates.len(), 1);
    }
}

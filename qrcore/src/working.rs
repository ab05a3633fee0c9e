//! The mutable overlay a search manipulates.
//!
//! A [`WorkingState`] carries the current value triple and fixed-slot flags
//! for every quantity of a model. It is the unit of the copy-on-branch
//! discipline: the simulator clones a working state before every candidate
//! transition and before every recursive branch, so sibling branches never
//! observe each other's mutations. The model itself is only borrowed and
//! never written to.

use bitflags::bitflags;

use qrmodel::{Model, QuantityId, Slot, State, StateEntry, ValueId, ValueTriple};

bitflags! {
    /// Which slots of a quantity were pinned by the current transition or by
    /// a repair, and may not be altered again until the state stabilizes.
    #[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
    pub struct FixedSlots: u8 {
        const MAGNITUDE = 1 << 0;
        const DERIVATIVE = 1 << 1;
        const SECOND = 1 << 2;
    }
}

impl FixedSlots {
    pub fn of(slot: Slot) -> Self {
        match slot {
            Slot::Magnitude => FixedSlots::MAGNITUDE,
            Slot::Derivative => FixedSlots::DERIVATIVE,
            Slot::Second => FixedSlots::SECOND,
        }
    }
}

/// Working values for all quantities of one model.
#[derive(Debug, Clone)]
pub struct WorkingState<'m> {
    model: &'m Model,
    values: Vec<ValueTriple>,
    fixed: Vec<FixedSlots>,
}

impl<'m> WorkingState<'m> {
    /// Start from every quantity's declared initial values, nothing fixed.
    pub fn initial(model: &'m Model) -> Self {
        let values = model.quantities().iter().map(|q| q.initial).collect();
        WorkingState {
            model,
            values,
            fixed: vec![FixedSlots::default(); model.len()],
        }
    }

    pub fn model(&self) -> &'m Model {
        self.model
    }

    pub fn triple(&self, id: QuantityId) -> ValueTriple {
        self.values[id.0]
    }

    pub fn value(&self, id: QuantityId, slot: Slot) -> ValueId {
        self.values[id.0].get(slot)
    }

    /// Overwrite a slot without fixing it (used by repairs that decide
    /// fixing themselves, and by the exhaustive-mode seeding).
    pub fn set(&mut self, id: QuantityId, slot: Slot, value: ValueId) {
        self.values[id.0].set(slot, value);
    }

    /// Overwrite a slot and pin it against further changes.
    pub fn set_fixed(&mut self, id: QuantityId, slot: Slot, value: ValueId) {
        self.values[id.0].set(slot, value);
        self.fixed[id.0] |= FixedSlots::of(slot);
    }

    pub fn is_fixed(&self, id: QuantityId, slot: Slot) -> bool {
        self.fixed[id.0].contains(FixedSlots::of(slot))
    }

    pub fn fix(&mut self, id: QuantityId, slot: Slot) {
        self.fixed[id.0] |= FixedSlots::of(slot);
    }

    /// Release every fixed flag; called once a candidate state has settled
    /// so the new state is a fresh starting point for the next round.
    pub fn clear_fixed(&mut self) {
        for flags in &mut self.fixed {
            *flags = FixedSlots::default();
        }
    }

    /// Freeze the current values into an immutable snapshot. Quantities that
    /// do not model their second derivative contribute a two-value entry.
    pub fn snapshot(&self) -> State {
        let entries = self
            .model
            .quantities()
            .iter()
            .zip(&self.values)
            .map(|(quantity, triple)| StateEntry {
                name: quantity.name.clone(),
                magnitude: triple.magnitude,
                derivative: triple.derivative,
                second: quantity.models_second.then_some(triple.second),
            })
            .collect();
        State::new(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrmodel::{ModelBuilder, QuantitySpec};

    fn model() -> Model {
        let mut builder = ModelBuilder::new();
        builder
            .quantity(QuantitySpec::new(
                "a",
                vec![ValueId::ZERO, ValueId::POSITIVE, ValueId::MAX],
            ))
            .quantity(
                QuantitySpec::new("b", vec![ValueId::ZERO, ValueId::POSITIVE]).first_order(),
            );
        builder.build().unwrap()
    }

    #[test]
    fn fixing_and_clearing() {
        let model = model();
        let mut ws = WorkingState::initial(&model);
        let a = model.index_of("a").unwrap();

        ws.set_fixed(a, Slot::Derivative, ValueId::POSITIVE);
        assert!(ws.is_fixed(a, Slot::Derivative));
        assert!(!ws.is_fixed(a, Slot::Magnitude));
        assert_eq!(ws.value(a, Slot::Derivative), ValueId::POSITIVE);

        ws.clear_fixed();
        assert!(!ws.is_fixed(a, Slot::Derivative));
        assert_eq!(ws.value(a, Slot::Derivative), ValueId::POSITIVE);
    }

    #[test]
    fn snapshot_omits_unmodelled_second_derivative() {
        let model = model();
        let ws = WorkingState::initial(&model);
        let state = ws.snapshot();
        assert_eq!(state.get("a").unwrap().second, Some(ValueId::ZERO));
        assert_eq!(state.get("b").unwrap().second, None);
    }

    #[test]
    fn clones_are_independent() {
        let model = model();
        let mut ws = WorkingState::initial(&model);
        let a = model.index_of("a").unwrap();
        let branch = ws.clone();
        ws.set_fixed(a, Slot::Magnitude, ValueId::MAX);
        assert_eq!(branch.value(a, Slot::Magnitude), ValueId::ZERO);
        assert!(!branch.is_fixed(a, Slot::Magnitude));
    }
}

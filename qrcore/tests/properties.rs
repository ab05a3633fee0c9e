//! Structural properties of the search, checked over the container models.

use petgraph::visit::EdgeRef;

use qrcore::engine::Simulator;
use qrcore::working::WorkingState;
use qrmodel::{Model, QuantityId, Slot, State, ValueId};

fn working_from<'m>(model: &'m Model, state: &State) -> WorkingState<'m> {
    let mut ws = WorkingState::initial(model);
    for (i, entry) in state.entries().iter().enumerate() {
        let q = QuantityId(i);
        ws.set(q, Slot::Magnitude, entry.magnitude);
        ws.set(q, Slot::Derivative, entry.derivative);
        if let Some(second) = entry.second {
            ws.set(q, Slot::Second, second);
        }
    }
    ws
}

fn models() -> Vec<Model> {
    vec![
        qrcore::scenarios::bathtub().unwrap(),
        qrcore::scenarios::bathtub_curved().unwrap(),
        qrcore::scenarios::bathtub_extended().unwrap(),
    ]
}

#[test]
fn every_reached_state_is_valid_and_settle_is_a_noop() {
    for model in models() {
        let mut sim = Simulator::new(&model);
        sim.run();
        for (_, state) in sim.states() {
            let mut ws = working_from(&model, state);
            for q in model.quantity_ids() {
                assert!(
                    ws.is_valid(q),
                    "reached state has invalid quantity '{}': {state:?}",
                    model.quantity(q).name
                );
            }
            assert!(ws.settle());
            assert_eq!(ws.snapshot(), *state, "settle changed an already-valid state");
        }
    }
}

#[test]
fn boundary_containment() {
    for model in models() {
        let mut sim = Simulator::new(&model);
        sim.run();
        let values = model.values();
        for (_, state) in sim.states() {
            for (q, entry) in model.quantity_ids().zip(state.entries()) {
                let space = &model.quantity(q).magnitude_space;
                let at_top = space.last() == Some(entry.magnitude)
                    && values.is_landmark(entry.magnitude);
                if at_top {
                    assert_ne!(entry.derivative, ValueId::POSITIVE, "{state:?}");
                    if entry.derivative == ValueId::ZERO {
                        assert_ne!(entry.second, Some(ValueId::POSITIVE), "{state:?}");
                    }
                }
            }
        }
    }
}

#[test]
fn no_self_loop_edges() {
    for model in models() {
        let mut sim = Simulator::new(&model);
        sim.run();
        for edge in sim.graph().edge_references() {
            assert_ne!(edge.source(), edge.target());
        }
    }
}

#[test]
fn state_count_is_deterministic() {
    for model in models() {
        let mut first = Simulator::new(&model);
        first.run();
        let mut second = Simulator::new(&model);
        second.run();
        assert_eq!(first.state_count(), second.state_count());
        assert_eq!(first.transition_count(), second.transition_count());
        for (_, state) in first.states() {
            assert!(second.find(state).is_some());
        }
    }
}

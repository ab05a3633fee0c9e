//! End-to-end behavior of the container scenarios.

use qrcore::engine::Simulator;
use qrcore::terminate::ambiguous_terminations;
use qrcore::working::WorkingState;
use qrmodel::{Slot, ValueId};

#[test]
fn container_fills_to_the_brim() {
    let model = qrcore::scenarios::bathtub().unwrap();
    let mut sim = Simulator::new(&model);
    sim.run();

    // The tap eventually fills the container: volume and outflow both reach
    // max with every derivative at rest.
    let filled = sim.states().find(|(_, state)| {
        state.magnitude("Volume") == Some(ValueId::MAX)
            && state.magnitude("Outflow") == Some(ValueId::MAX)
            && state
                .entries()
                .iter()
                .all(|entry| entry.derivative == ValueId::ZERO)
    });
    let (filled_index, _) = filled.expect("the filled state was never reached");

    // The correspondences forbid a full container with a closed drain.
    for (_, state) in sim.states() {
        assert!(
            !(state.magnitude("Volume") == Some(ValueId::MAX)
                && state.magnitude("Outflow") == Some(ValueId::ZERO)),
            "value correspondence violated: {state:?}"
        );
    }

    // The exogenous tap keeps the filled state alive, but no successor lets
    // the container leave the brim in a single step.
    for successor in sim.successors(filled_index) {
        let state = sim.state(successor);
        assert_eq!(state.magnitude("Volume"), Some(ValueId::MAX));
        assert_eq!(state.magnitude("Outflow"), Some(ValueId::MAX));
    }
}

#[test]
fn opposing_influences_yield_two_ambiguous_branches() {
    let model = qrcore::scenarios::bathtub_curved().unwrap();
    let volume = model.index_of("Volume").unwrap();
    let mut ws = WorkingState::initial(&model);
    for name in ["Inflow", "Volume", "Outflow"] {
        let q = model.index_of(name).unwrap();
        ws.set(q, Slot::Magnitude, ValueId::POSITIVE);
        ws.set(q, Slot::Derivative, ValueId::POSITIVE);
    }
    // The fixture seeds Volume's second derivative positive; the two-branch
    // case requires it to start at zero.
    ws.set(volume, Slot::Second, ValueId::ZERO);

    // Volume's second derivative receives one positive (inflow) and one
    // negative (outflow) contribution while currently zero.
    let proposals = ambiguous_terminations(&ws);
    assert_eq!(proposals.len(), 2);
    let targets: Vec<ValueId> = proposals
        .iter()
        .map(|t| {
            let changes: Vec<_> = t.iter().collect();
            assert_eq!(changes.len(), 1);
            let (q, slot, change) = changes[0];
            assert_eq!(q, volume);
            assert_eq!(slot, Slot::Second);
            change.to
        })
        .collect();
    assert!(targets.contains(&ValueId::POSITIVE));
    assert!(targets.contains(&ValueId::NEGATIVE));
}

#[test]
fn nonzero_ambiguous_second_proposes_only_the_reset() {
    let model = qrcore::scenarios::bathtub_curved().unwrap();
    let volume = model.index_of("Volume").unwrap();
    let mut ws = WorkingState::initial(&model);
    for name in ["Inflow", "Volume", "Outflow"] {
        let q = model.index_of(name).unwrap();
        ws.set(q, Slot::Magnitude, ValueId::POSITIVE);
        ws.set(q, Slot::Derivative, ValueId::POSITIVE);
    }
    assert_eq!(ws.value(volume, Slot::Second), ValueId::POSITIVE);

    let proposals = ambiguous_terminations(&ws);
    assert_eq!(proposals.len(), 1);
    let changes: Vec<_> = proposals[0].iter().collect();
    assert_eq!(changes.len(), 1);
    let (q, slot, change) = changes[0];
    assert_eq!(q, volume);
    assert_eq!(slot, Slot::Second);
    assert_eq!(change.to, ValueId::ZERO);
}

#[test]
fn exhaustive_search_covers_the_incremental_graph() {
    let model = qrcore::scenarios::bathtub().unwrap();

    let mut incremental = Simulator::new(&model);
    incremental.run();
    let mut exhaustive = Simulator::new(&model);
    exhaustive.run_exhaustive();

    assert!(exhaustive.state_count() >= incremental.state_count());
    for (_, state) in incremental.states() {
        assert!(
            exhaustive.find(state).is_some(),
            "incrementally reached state missing from exhaustive run: {state:?}"
        );
    }
}

#[test]
fn trace_writers_produce_output() {
    let model = qrcore::scenarios::bathtub().unwrap();
    let mut sim = Simulator::new(&model);
    sim.run();

    let mut dot = Vec::new();
    qrcore::trace::write_state_graph_dot(&sim, &mut dot).unwrap();
    let dot = String::from_utf8(dot).unwrap();
    assert!(dot.starts_with("digraph"));
    assert!(dot.contains("S0"));

    let mut model_dot = Vec::new();
    qrcore::trace::write_model_dot(&model, &mut model_dot).unwrap();
    let model_dot = String::from_utf8(model_dot).unwrap();
    assert!(model_dot.contains("Volume"));
    assert!(model_dot.contains("I+"));
    // quantities are grouped under their owning entities
    assert!(model_dot.contains("subgraph cluster_0"));
    assert!(model_dot.contains("label=\"Tap\""));
    assert!(model_dot.contains("label=\"Container\""));
    assert!(model_dot.contains("label=\"Drain\""));

    let mut transitions = Vec::new();
    qrcore::trace::write_transitions(&sim, &mut transitions).unwrap();
    assert!(!transitions.is_empty());
}

//! The state-graph builder: applies transitions, deduplicates states and
//! recursively explores until no new state is reachable.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

use qrmodel::{Model, Slot, State};

use crate::compose::compose;
use crate::terminate::{self, Termination};
use crate::working::WorkingState;

/// Apply a transition to a copy of the working state and settle it.
///
/// Every requested slot is assigned and marked fixed, then the repair fixed
/// point runs across all quantities. A failed repair rejects the candidate
/// (this is the common case, not an error). On success the fixed flags are
/// cleared so the result is a fresh frozen starting point.
pub fn apply<'m>(
    transition: &Termination,
    ws: &WorkingState<'m>,
) -> Option<WorkingState<'m>> {
    let mut next = ws.clone();
    for (q, slot, change) in transition.iter() {
        next.set_fixed(q, slot, change.to);
    }
    if next.settle() {
        next.clear_fixed();
        Some(next)
    } else {
        None
    }
}

/// Depth-first exploration of the reachable state space of one model.
///
/// States are nodes of a directed graph in discovery order; each edge carries
/// the [`Termination`] that produced it. Reaching an already-known state adds
/// an edge (self-loops and duplicate edges excluded) without re-entering it.
pub struct Simulator<'m> {
    model: &'m Model,
    graph: DiGraph<State, Termination>,
    index: HashMap<State, NodeIndex>,
}

impl<'m> Simulator<'m> {
    pub fn new(model: &'m Model) -> Self {
        Simulator {
            model,
            graph: DiGraph::new(),
            index: HashMap::new(),
        }
    }

    pub fn model(&self) -> &'m Model {
        self.model
    }

    /// Explore from the model's declared initial values.
    pub fn run(&mut self) {
        self.explore(WorkingState::initial(self.model), None);
    }

    /// Seed every causally valid combination of slot values as its own root
    /// and explore from each. Cost is the product of all space sizes; this
    /// exists to validate the incremental search against brute force on
    /// small models, not for routine use.
    pub fn run_exhaustive(&mut self) {
        let mut dims = Vec::new();
        for q in self.model.quantity_ids() {
            let quantity = self.model.quantity(q);
            dims.push((q, Slot::Magnitude, quantity.magnitude_space.clone()));
            dims.push((q, Slot::Derivative, quantity.derivative_space.clone()));
            if quantity.models_second {
                dims.push((q, Slot::Second, quantity.second_space.clone()));
            }
        }

        let mut counters = vec![0usize; dims.len()];
        loop {
            let mut ws = WorkingState::initial(self.model);
            for ((q, slot, space), &i) in dims.iter().zip(&counters) {
                if let Some(value) = space.get(i) {
                    ws.set(*q, *slot, value);
                }
            }
            if self.model.quantity_ids().all(|q| ws.is_valid(q)) {
                self.explore(ws, None);
            }

            // odometer increment over the mixed-radix counter
            let mut k = 0;
            loop {
                if k == dims.len() {
                    return;
                }
                counters[k] += 1;
                if counters[k] < dims[k].2.len() {
                    break;
                }
                counters[k] = 0;
                k += 1;
            }
        }
    }

    fn explore(&mut self, ws: WorkingState<'m>, origin: Option<(NodeIndex, Termination)>) {
        let state = ws.snapshot();
        if let Some(&existing) = self.index.get(&state) {
            if let Some((predecessor, label)) = origin
                && predecessor != existing
                && self.graph.find_edge(predecessor, existing).is_none()
            {
                self.graph.add_edge(predecessor, existing, label);
            }
            return;
        }

        let node = self.graph.add_node(state.clone());
        self.index.insert(state, node);
        if let Some((predecessor, label)) = origin {
            self.graph.add_edge(predecessor, node, label);
        }

        let (epsilon, optional) = terminate::generate(&ws);
        for transition in compose(&epsilon, &optional) {
            if transition.is_empty() {
                continue;
            }
            if let Some(next) = apply(&transition, &ws) {
                self.explore(next, Some((node, transition)));
            }
        }
    }

    pub fn graph(&self) -> &DiGraph<State, Termination> {
        &self.graph
    }

    pub fn states(&self) -> impl Iterator<Item = (NodeIndex, &State)> {
        self.graph.node_indices().map(|i| (i, &self.graph[i]))
    }

    pub fn state(&self, index: NodeIndex) -> &State {
        &self.graph[index]
    }

    /// Index of an already-discovered state, if present.
    pub fn find(&self, state: &State) -> Option<NodeIndex> {
        self.index.get(state).copied()
    }

    pub fn predecessors(&self, index: NodeIndex) -> impl Iterator<Item = NodeIndex> {
        self.graph.neighbors_directed(index, Direction::Incoming)
    }

    pub fn successors(&self, index: NodeIndex) -> impl Iterator<Item = NodeIndex> {
        self.graph.neighbors_directed(index, Direction::Outgoing)
    }

    /// The termination labelling the edge from `predecessor` to `index`.
    pub fn label(&self, index: NodeIndex, predecessor: NodeIndex) -> Option<&Termination> {
        self.graph
            .find_edge(predecessor, index)
            .and_then(|e| self.graph.edge_weight(e))
    }

    pub fn state_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn transition_count(&self) -> usize {
        self.graph.edge_count()
    }
}

//! Rendering of a finished search: Graphviz dumps and narrated traces.
//!
//! These writers only read the simulator's graph; nothing here feeds back
//! into the search.

use std::io::Write;

use petgraph::visit::EdgeRef;

use qrmodel::{Model, QuantityId, RelationKind, State, ValueId, ValueTable};

use crate::engine::Simulator;
use crate::error::QrResult;

fn entry_line(state: &State, values: &ValueTable, separator: &str) -> String {
    state
        .entries()
        .iter()
        .map(|e| {
            let mut s = format!(
                "{} ({}, {}",
                e.name,
                values.name(e.magnitude),
                values.name(e.derivative)
            );
            if let Some(second) = e.second {
                s.push_str(", ");
                s.push_str(values.name(second));
            }
            s.push(')');
            s
        })
        .collect::<Vec<_>>()
        .join(separator)
}

fn quantity_node(w: &mut impl Write, model: &Model, q: QuantityId, indent: &str) -> QrResult<()> {
    let quantity = model.quantity(q);
    let mut attrs = String::new();
    if quantity.exogenous {
        attrs.push_str(" style=dashed");
    }
    writeln!(w, "{indent}q{} [label=\"{}\"{attrs}];", q.0, quantity.name)?;
    Ok(())
}

/// Graphviz rendering of the model itself: quantities as nodes grouped under
/// their owning entity, relations as labelled edges.
pub fn write_model_dot(model: &Model, w: &mut impl Write) -> QrResult<()> {
    let values = model.values();
    writeln!(w, "digraph model {{")?;

    // one grey cluster per entity, in first-appearance order
    let mut entities: Vec<(&str, Vec<QuantityId>)> = Vec::new();
    let mut loose = Vec::new();
    for q in model.quantity_ids() {
        match &model.quantity(q).entity {
            Some(entity) => match entities.iter_mut().find(|(name, _)| *name == entity.as_str()) {
                Some((_, members)) => members.push(q),
                None => entities.push((entity.as_str(), vec![q])),
            },
            None => loose.push(q),
        }
    }
    for (cluster, (entity, members)) in entities.iter().enumerate() {
        writeln!(w, "    subgraph cluster_{cluster} {{")?;
        writeln!(w, "        label=\"{entity}\";")?;
        writeln!(w, "        style=filled;")?;
        writeln!(w, "        color=lightgrey;")?;
        for &q in members {
            quantity_node(w, model, q, "        ")?;
        }
        writeln!(w, "    }}")?;
    }
    for q in loose {
        quantity_node(w, model, q, "    ")?;
    }

    for relation in model.relations() {
        writeln!(
            w,
            "    q{} -> q{} [label=\"{}\"];",
            relation.source.0,
            relation.target.0,
            relation.label(values)
        )?;
    }
    writeln!(w, "}}")?;
    Ok(())
}

/// Graphviz rendering of the reachability graph, states numbered in
/// discovery order.
pub fn write_state_graph_dot(sim: &Simulator<'_>, w: &mut impl Write) -> QrResult<()> {
    let model = sim.model();
    let values = model.values();
    writeln!(w, "digraph states {{")?;
    writeln!(w, "    rankdir=LR;")?;
    writeln!(w, "    node [shape=box];")?;
    for (index, state) in sim.states() {
        writeln!(
            w,
            "    s{} [label=\"S{}\\n{}\"];",
            index.index(),
            index.index(),
            entry_line(state, values, "\\n")
        )?;
    }
    for edge in sim.graph().edge_references() {
        let kinds: Vec<String> = edge
            .weight()
            .iter()
            .map(|(q, slot, change)| {
                format!(
                    "{} {slot}={}",
                    model.quantity(q).name,
                    values.name(change.to)
                )
            })
            .collect();
        writeln!(
            w,
            "    s{} -> s{} [label=\"{}\"];",
            edge.source().index(),
            edge.target().index(),
            kinds.join("\\n")
        )?;
    }
    writeln!(w, "}}")?;
    Ok(())
}

/// One line per transition, each change rendered against its source state.
pub fn write_transitions(sim: &Simulator<'_>, w: &mut impl Write) -> QrResult<()> {
    let model = sim.model();
    for edge in sim.graph().edge_references() {
        let before = sim.state(edge.source());
        writeln!(
            w,
            "S{} -> S{}: {}",
            edge.source().index(),
            edge.target().index(),
            edge.weight().describe(model, before)
        )?;
    }
    Ok(())
}

/// Narrate every discovered state in isolation: the quantity values plus
/// which relations are exerting an effect in that state.
pub fn write_intra_state_trace(sim: &Simulator<'_>, w: &mut impl Write) -> QrResult<()> {
    let model = sim.model();
    let values = model.values();
    for (index, state) in sim.states() {
        writeln!(w, "State S{}:", index.index())?;
        for entry in state.entries() {
            let mut line = format!(
                "    {} has magnitude {} and derivative {}",
                entry.name,
                values.name(entry.magnitude),
                values.name(entry.derivative)
            );
            if let Some(second) = entry.second {
                line.push_str(&format!(" and second derivative {}", values.name(second)));
            }
            writeln!(w, "{line}")?;
        }
        for relation in model.relations() {
            let source = model.quantity(relation.source);
            let target = model.quantity(relation.target);
            let active = match relation.kind {
                RelationKind::Influence => state
                    .magnitude(&source.name)
                    .is_some_and(|m| m == ValueId::POSITIVE || m == ValueId::MAX),
                RelationKind::Proportional => state
                    .derivative(&source.name)
                    .is_some_and(|d| d != ValueId::ZERO),
                RelationKind::ValueCorrespondence => relation
                    .correspondence
                    .is_some_and(|(sv, _)| state.magnitude(&source.name) == Some(sv)),
            };
            writeln!(
                w,
                "    {} {} {} is {}",
                source.name,
                relation.label(values),
                target.name,
                if active { "active" } else { "dormant" }
            )?;
        }
    }
    Ok(())
}

/// Narrate every transition between states.
pub fn write_inter_state_trace(sim: &Simulator<'_>, w: &mut impl Write) -> QrResult<()> {
    let model = sim.model();
    for edge in sim.graph().edge_references() {
        let before = sim.state(edge.source());
        writeln!(
            w,
            "From S{}, {} which leads to S{}.",
            edge.source().index(),
            edge.weight().describe(model, before),
            edge.target().index()
        )?;
    }
    Ok(())
}

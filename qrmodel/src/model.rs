//! Model assembly: quantities, relationships, and the value table, built once
//! and immutable for the lifetime of a search.

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::quantity::{Quantity, QuantityId, Slot, ValueTriple};
use crate::relation::{Polarity, RelationId, RelationKind, Relationship};
use crate::space::Space;
use crate::values::{ValueId, ValueTable};

/// A complete causal model: the input contract of the simulation engine.
///
/// The engine never mutates a model; all search-time value changes happen on
/// working copies owned by the engine.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Model {
    values: ValueTable,
    quantities: Vec<Quantity>,
    relations: Vec<Relationship>,
    index: HashMap<String, QuantityId>,
}

impl Model {
    pub fn values(&self) -> &ValueTable {
        &self.values
    }

    pub fn quantities(&self) -> &[Quantity] {
        &self.quantities
    }

    pub fn quantity(&self, id: QuantityId) -> &Quantity {
        &self.quantities[id.0]
    }

    pub fn relations(&self) -> &[Relationship] {
        &self.relations
    }

    pub fn relation(&self, id: RelationId) -> &Relationship {
        &self.relations[id.0]
    }

    /// Name → position index, built once at construction time.
    pub fn index_of(&self, name: &str) -> Option<QuantityId> {
        self.index.get(name).copied()
    }

    pub fn quantity_ids(&self) -> impl Iterator<Item = QuantityId> {
        (0..self.quantities.len()).map(QuantityId)
    }

    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }
}

/// Description of one quantity handed to the [`ModelBuilder`].
#[derive(Debug, Clone)]
pub struct QuantitySpec {
    pub name: String,
    pub entity: Option<String>,
    pub magnitude_space: Vec<ValueId>,
    pub derivative_space: Vec<ValueId>,
    pub second_space: Vec<ValueId>,
    pub models_second: bool,
    pub exogenous: bool,
    pub initial: ValueTriple,
}

impl QuantitySpec {
    /// A quantity with the given magnitude space, sign spaces for both
    /// derivative slots, second derivative modelled, and all slots starting
    /// at `zero`.
    pub fn new(name: impl Into<String>, magnitude_space: Vec<ValueId>) -> Self {
        let signs = vec![ValueId::NEGATIVE, ValueId::ZERO, ValueId::POSITIVE];
        QuantitySpec {
            name: name.into(),
            entity: None,
            magnitude_space,
            derivative_space: signs.clone(),
            second_space: signs,
            models_second: true,
            exogenous: false,
            initial: ValueTriple::zero(),
        }
    }

    pub fn exogenous(mut self) -> Self {
        self.exogenous = true;
        self
    }

    /// Attach the quantity to a named physical entity.
    pub fn owned_by(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn first_order(mut self) -> Self {
        self.models_second = false;
        self
    }

    pub fn with_initial(mut self, slot: Slot, value: ValueId) -> Self {
        self.initial.set(slot, value);
        self
    }
}

struct RelationSpec {
    kind: RelationKind,
    polarity: Polarity,
    source: String,
    target: String,
    correspondence: Option<(ValueId, ValueId)>,
}

/// Accumulates quantities and relationships, validates them as a whole, and
/// produces an immutable [`Model`].
pub struct ModelBuilder {
    values: ValueTable,
    quantities: Vec<QuantitySpec>,
    relations: Vec<RelationSpec>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        ModelBuilder {
            values: ValueTable::new(),
            quantities: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Intern a user-defined symbolic value for use in custom spaces.
    pub fn value(&mut self, name: &str, landmark: bool) -> Result<ValueId, ModelError> {
        self.values.intern(name, landmark)
    }

    pub fn quantity(&mut self, spec: QuantitySpec) -> &mut Self {
        self.quantities.push(spec);
        self
    }

    pub fn proportional(
        &mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        polarity: Polarity,
    ) -> &mut Self {
        self.relations.push(RelationSpec {
            kind: RelationKind::Proportional,
            polarity,
            source: source.into(),
            target: target.into(),
            correspondence: None,
        });
        self
    }

    pub fn influence(
        &mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        polarity: Polarity,
    ) -> &mut Self {
        self.relations.push(RelationSpec {
            kind: RelationKind::Influence,
            polarity,
            source: source.into(),
            target: target.into(),
            correspondence: None,
        });
        self
    }

    pub fn correspondence(
        &mut self,
        source: impl Into<String>,
        source_value: ValueId,
        target: impl Into<String>,
        target_value: ValueId,
    ) -> &mut Self {
        self.relations.push(RelationSpec {
            kind: RelationKind::ValueCorrespondence,
            polarity: Polarity::Positive,
            source: source.into(),
            target: target.into(),
            correspondence: Some((source_value, target_value)),
        });
        self
    }

    /// Validate the accumulated description and build the model.
    pub fn build(self) -> Result<Model, ModelError> {
        let mut index: HashMap<String, QuantityId> = HashMap::new();
        let mut quantities = Vec::with_capacity(self.quantities.len());

        for (pos, spec) in self.quantities.into_iter().enumerate() {
            if index.insert(spec.name.clone(), QuantityId(pos)).is_some() {
                return Err(ModelError::DuplicateQuantity(spec.name));
            }
            let quantity = Quantity {
                entity: spec.entity,
                magnitude_space: Space::new(spec.magnitude_space),
                derivative_space: Space::new(spec.derivative_space),
                second_space: Space::new(spec.second_space),
                models_second: spec.models_second,
                exogenous: spec.exogenous,
                initial: spec.initial,
                incoming: Vec::new(),
                name: spec.name,
            };
            for slot in [Slot::Magnitude, Slot::Derivative, Slot::Second] {
                let space = quantity.space(slot);
                if space.is_empty() {
                    return Err(ModelError::EmptySpace {
                        quantity: quantity.name.clone(),
                        slot,
                    });
                }
                let initial = quantity.initial.get(slot);
                if !space.contains(initial) {
                    return Err(ModelError::InitialValueOutsideSpace {
                        quantity: quantity.name.clone(),
                        slot,
                        value: self.values.name(initial).to_owned(),
                    });
                }
            }
            quantities.push(quantity);
        }

        let mut relations = Vec::with_capacity(self.relations.len());
        for (pos, spec) in self.relations.into_iter().enumerate() {
            let source = *index
                .get(&spec.source)
                .ok_or_else(|| ModelError::UnknownQuantity(spec.source.clone()))?;
            let target = *index
                .get(&spec.target)
                .ok_or_else(|| ModelError::UnknownQuantity(spec.target.clone()))?;
            if source == target {
                return Err(ModelError::SelfRelation(spec.source));
            }
            if let Some((sv, tv)) = spec.correspondence {
                for (id, value) in [(source, sv), (target, tv)] {
                    let quantity = &quantities[id.0];
                    if !quantity.magnitude_space.contains(value) {
                        return Err(ModelError::CorrespondenceOutsideSpace {
                            quantity: quantity.name.clone(),
                            value: self.values.name(value).to_owned(),
                        });
                    }
                }
            }
            quantities[target.0].incoming.push(RelationId(pos));
            relations.push(Relationship {
                kind: spec.kind,
                polarity: spec.polarity,
                source,
                target,
                correspondence: spec.correspondence,
            });
        }

        Ok(Model {
            values: self.values,
            quantities,
            relations,
            index,
        })
    }
}

impl Default for ModelBuilder {
    fn default() -> Self {
        ModelBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_quantities() -> ModelBuilder {
        let mut builder = ModelBuilder::new();
        builder
            .quantity(QuantitySpec::new(
                "a",
                vec![ValueId::ZERO, ValueId::POSITIVE, ValueId::MAX],
            ))
            .quantity(QuantitySpec::new(
                "b",
                vec![ValueId::ZERO, ValueId::POSITIVE, ValueId::MAX],
            ));
        builder
    }

    #[test]
    fn builds_and_wires_incoming_relations() {
        let mut builder = two_quantities();
        builder.proportional("a", "b", Polarity::Positive);
        builder.influence("b", "a", Polarity::Negative);
        let model = builder.build().unwrap();

        let a = model.index_of("a").unwrap();
        let b = model.index_of("b").unwrap();
        assert_eq!(model.quantity(a).incoming(), &[RelationId(1)]);
        assert_eq!(model.quantity(b).incoming(), &[RelationId(0)]);
        assert_eq!(model.relation(RelationId(0)).source, a);
        assert_eq!(model.relation(RelationId(0)).target, b);
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut builder = two_quantities();
        builder.quantity(QuantitySpec::new("a", vec![ValueId::ZERO]));
        assert!(matches!(
            builder.build(),
            Err(ModelError::DuplicateQuantity(_))
        ));
    }

    #[test]
    fn rejects_unknown_relation_endpoint() {
        let mut builder = two_quantities();
        builder.proportional("a", "missing", Polarity::Positive);
        assert!(matches!(
            builder.build(),
            Err(ModelError::UnknownQuantity(_))
        ));
    }

    #[test]
    fn rejects_initial_value_outside_space() {
        let mut builder = ModelBuilder::new();
        builder.quantity(
            QuantitySpec::new("a", vec![ValueId::ZERO, ValueId::POSITIVE])
                .with_initial(Slot::Magnitude, ValueId::MAX),
        );
        assert!(matches!(
            builder.build(),
            Err(ModelError::InitialValueOutsideSpace { .. })
        ));
    }

    #[test]
    fn rejects_correspondence_outside_space() {
        let mut builder = two_quantities();
        builder.correspondence("a", ValueId::MIN, "b", ValueId::MAX);
        assert!(matches!(
            builder.build(),
            Err(ModelError::CorrespondenceOutsideSpace { .. })
        ));
    }
}

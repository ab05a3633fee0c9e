//! Ready-made models of the classic container system: an exogenous tap
//! filling a volume that drains through an outflow. Used by the demo binary
//! and the integration tests.

use qrmodel::{Model, ModelBuilder, ModelError, Polarity, QuantitySpec, Slot, ValueId};

fn container_quantities(builder: &mut ModelBuilder, curved_volume: bool) {
    let mut volume = QuantitySpec::new(
        "Volume",
        vec![ValueId::ZERO, ValueId::POSITIVE, ValueId::MAX],
    );
    if curved_volume {
        // The opening tap accelerates the volume from the first instant, so
        // the seed state is causally consistent.
        volume = volume.with_initial(Slot::Second, ValueId::POSITIVE);
    } else {
        volume = volume.first_order();
    }
    builder
        .quantity(
            QuantitySpec::new("Inflow", vec![ValueId::ZERO, ValueId::POSITIVE])
                .exogenous()
                .first_order()
                .owned_by("Tap")
                .with_initial(Slot::Derivative, ValueId::POSITIVE),
        )
        .quantity(volume.owned_by("Container"))
        .quantity(
            QuantitySpec::new(
                "Outflow",
                vec![ValueId::ZERO, ValueId::POSITIVE, ValueId::MAX],
            )
            .first_order()
            .owned_by("Drain"),
        );
    builder
        .influence("Inflow", "Volume", Polarity::Positive)
        .influence("Outflow", "Volume", Polarity::Negative);
}

/// The first-order container: inflow fills, outflow drains proportionally to
/// volume, with value correspondences pinning the two extremes together.
pub fn bathtub() -> Result<Model, ModelError> {
    let mut builder = ModelBuilder::new();
    container_quantities(&mut builder, false);
    builder
        .proportional("Volume", "Outflow", Polarity::Positive)
        .correspondence("Volume", ValueId::MAX, "Outflow", ValueId::MAX)
        .correspondence("Volume", ValueId::ZERO, "Outflow", ValueId::ZERO);
    builder.build()
}

/// The first-order container with the extreme correspondences mirrored in
/// both directions, so a full or empty outflow also pins the volume.
pub fn bathtub_bidirectional() -> Result<Model, ModelError> {
    let mut builder = ModelBuilder::new();
    container_quantities(&mut builder, false);
    builder
        .proportional("Volume", "Outflow", Polarity::Positive)
        .correspondence("Volume", ValueId::MAX, "Outflow", ValueId::MAX)
        .correspondence("Volume", ValueId::ZERO, "Outflow", ValueId::ZERO)
        .correspondence("Outflow", ValueId::MAX, "Volume", ValueId::MAX)
        .correspondence("Outflow", ValueId::ZERO, "Volume", ValueId::ZERO);
    builder.build()
}

/// The container with a curved volume: Volume models its second derivative,
/// which the opposing influences leave structurally undetermined, so the
/// search branches on ambiguous terminations.
pub fn bathtub_curved() -> Result<Model, ModelError> {
    let mut builder = ModelBuilder::new();
    container_quantities(&mut builder, true);
    builder
        .proportional("Volume", "Outflow", Polarity::Positive)
        .correspondence("Volume", ValueId::MAX, "Outflow", ValueId::MAX)
        .correspondence("Volume", ValueId::ZERO, "Outflow", ValueId::ZERO);
    builder.build()
}

/// The container with the drain chain spelled out: volume determines height,
/// height determines pressure, and pressure (not volume) drives the outflow.
/// All three derived quantities stay corresponded at both extremes.
pub fn bathtub_extended() -> Result<Model, ModelError> {
    let mut builder = ModelBuilder::new();
    container_quantities(&mut builder, false);
    let extremes = vec![ValueId::ZERO, ValueId::POSITIVE, ValueId::MAX];
    builder
        .quantity(
            QuantitySpec::new("Height", extremes.clone())
                .first_order()
                .owned_by("Container"),
        )
        .quantity(
            QuantitySpec::new("Pressure", extremes)
                .first_order()
                .owned_by("Container"),
        );
    builder
        .proportional("Volume", "Height", Polarity::Positive)
        .proportional("Height", "Pressure", Polarity::Positive)
        .proportional("Pressure", "Outflow", Polarity::Positive);
    for (source, target) in [
        ("Volume", "Height"),
        ("Height", "Pressure"),
        ("Pressure", "Outflow"),
    ] {
        builder
            .correspondence(source, ValueId::MAX, target, ValueId::MAX)
            .correspondence(source, ValueId::ZERO, target, ValueId::ZERO);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_build() {
        assert!(bathtub().is_ok());
        assert!(bathtub_bidirectional().is_ok());
        assert!(bathtub_curved().is_ok());
        assert!(bathtub_extended().is_ok());
    }

    #[test]
    fn bathtub_shape() {
        let model = bathtub().unwrap();
        assert_eq!(model.len(), 3);
        assert_eq!(model.relations().len(), 5);
        let inflow = model.index_of("Inflow").unwrap();
        assert!(model.quantity(inflow).exogenous);
        assert!(!model.quantity(inflow).models_second);
        assert_eq!(model.quantity(inflow).entity.as_deref(), Some("Tap"));
    }
}

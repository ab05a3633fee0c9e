use thiserror::Error;

use crate::quantity::Slot;

/// Errors raised while constructing a model.
///
/// Everything here is a defect in the supplied model description; once a
/// model builds successfully the search itself cannot produce these.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("value '{name}' is already registered with a different landmark flag")]
    LandmarkMismatch { name: String },

    #[error("duplicate quantity name '{0}'")]
    DuplicateQuantity(String),

    #[error("unknown quantity '{0}' referenced by a relationship")]
    UnknownQuantity(String),

    #[error("quantity '{quantity}': {slot} space is empty")]
    EmptySpace { quantity: String, slot: Slot },

    #[error("quantity '{quantity}': initial {slot} value '{value}' is not in its space")]
    InitialValueOutsideSpace {
        quantity: String,
        slot: Slot,
        value: String,
    },

    #[error("correspondence value '{value}' is not in the magnitude space of '{quantity}'")]
    CorrespondenceOutsideSpace { quantity: String, value: String },

    #[error("a relationship may not link quantity '{0}' to itself")]
    SelfRelation(String),
}

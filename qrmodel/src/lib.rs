//! Model primitives for qualitative simulation.
//!
//! A qualitative model consists of *quantities* (state variables whose
//! magnitude, derivative, and optional second derivative range over ordered
//! symbolic value spaces) and *relationships* (proportionalities, influences,
//! and value correspondences between quantities). This crate defines those
//! structures, the symbolic value table behind them, and the immutable state
//! snapshots exchanged with the engine crate; the search algorithm itself
//! lives in `qrcore`.

pub mod error;
pub mod model;
pub mod quantity;
pub mod relation;
pub mod space;
pub mod state;
pub mod values;

pub use error::ModelError;
pub use model::{Model, ModelBuilder, QuantitySpec};
pub use quantity::{Quantity, QuantityId, Slot, ValueTriple};
pub use relation::{Polarity, RelationId, RelationKind, Relationship};
pub use space::Space;
pub use state::{State, StateEntry};
pub use values::{ValueId, ValueTable};

//! Qualitative simulation engine.
//!
//! Given a causal model built with [`qrmodel`], the engine computes the
//! complete graph of qualitatively distinct states the modelled system can
//! pass through. From each state it generates candidate value changes
//! ([`terminate`]), combines them into composite transitions ([`compose`]),
//! resolves each candidate against the causal constraints with a fixed-point
//! repair loop ([`check`]), and deduplicates the resulting states into a
//! directed reachability graph ([`engine`]). Finished graphs can be rendered
//! with the writers in [`trace`].

pub mod check;
pub mod compose;
pub mod engine;
pub mod error;
pub mod scenarios;
pub mod terminate;
pub mod trace;
pub mod working;

pub use qrmodel;

pub use check::{Influences, Requirement, requirement};
pub use compose::compose;
pub use engine::{Simulator, apply};
pub use error::{QrError, QrResult};
pub use terminate::{SlotChange, Termination, TerminationKind, generate};
pub use working::{FixedSlots, WorkingState};

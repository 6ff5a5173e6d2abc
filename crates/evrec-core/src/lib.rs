//! Core types and traits for the evrec event record.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the workspace: typed
//! handles into the event arenas, four-vector kinematics, particle
//! species descriptions, and the traits external collaborators implement.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod id;
pub mod kinematics;
pub mod species;
pub mod traits;

pub use id::{CollisionId, ColourLineId, ParticleId, StepId, SubProcessId};
pub use kinematics::{Lorentz5Momentum, LorentzPoint};
pub use species::{ColourRep, ParticleData, SpeciesRef};
pub use traits::{ArenaKey, LifetimeModel, NominalLifetime};

//! evrec: the event record of a particle-physics Monte Carlo generator.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all evrec sub-crates. For most users, adding `evrec` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use evrec::prelude::*;
//!
//! let proton = ParticleData::new(2212, "p+", 0.938, 3).shared();
//! let up = ParticleData::new(2, "u", 0.0022, 2)
//!     .with_colour(ColourRep::Triplet)
//!     .shared();
//! let ubar = ParticleData::new(-2, "ubar", 0.0022, -2)
//!     .with_colour(ColourRep::AntiTriplet)
//!     .shared();
//! let photon = ParticleData::new(22, "gamma", 0.0, 0).shared();
//!
//! let mut event = Event::new(EventConfig::named("quick-start", 1)).unwrap();
//! let b1 = event
//!     .create_particle(proton.clone(), Lorentz5Momentum::from_mass(0.0, 0.0, 6500.0, 0.938))
//!     .unwrap();
//! let b2 = event
//!     .create_particle(proton, Lorentz5Momentum::from_mass(0.0, 0.0, -6500.0, 0.938))
//!     .unwrap();
//! let q = event
//!     .create_particle(up, Lorentz5Momentum::from_mass(0.0, 0.0, 100.0, 0.0))
//!     .unwrap();
//! let qbar = event
//!     .create_particle(ubar, Lorentz5Momentum::from_mass(0.0, 0.0, -100.0, 0.0))
//!     .unwrap();
//! event.colour_connect(q, qbar, false).unwrap();
//! let g1 = event
//!     .create_particle(photon.clone(), Lorentz5Momentum::from_mass(50.0, 0.0, 0.0, 0.0))
//!     .unwrap();
//! let g2 = event
//!     .create_particle(photon, Lorentz5Momentum::from_mass(-50.0, 0.0, 0.0, 0.0))
//!     .unwrap();
//!
//! let collision = event.new_collision(b1, b2).unwrap();
//! let step = event.collision_mut(collision).unwrap().new_step().unwrap();
//! let sp = event.new_sub_process((q, qbar), "uubar->gammagamma").unwrap();
//! {
//!     let mut cur = event.sub_process_mut(sp).unwrap();
//!     cur.add_outgoing(g1, true).unwrap();
//!     cur.add_outgoing(g2, true).unwrap();
//! }
//! event.step_mut(step).unwrap().add_sub_process(sp).unwrap();
//!
//! assert_eq!(event.final_state(), vec![g1, g2]);
//! let graph = evrec::export::convert(&event).unwrap();
//! // One vertex per beam splitting off a parton, plus the hard process.
//! assert_eq!(graph.vertex_count(), 3);
//! assert!(graph.signal_vertex.is_some());
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `evrec-core` | Handles, kinematics, species data, lifetime model |
//! | [`arena`] | `evrec-arena` | Generational slot arena and its config |
//! | [`record`] | `evrec-record` | Particles, steps, sub-processes, collisions, events |
//! | [`export`] | `evrec-export` | Vertex-graph export of finished events |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Handles, kinematics and species data (`evrec-core`).
pub use evrec_core as types;

/// Generational slot arena (`evrec-arena`).
///
/// Events build their arenas from an [`arena::ArenaConfig`]; the arena
/// itself is rarely needed directly.
pub use evrec_arena as arena;

/// The event record (`evrec-record`).
///
/// [`record::Event`] owns everything. Edit it through the cursors
/// [`record::StepMut`], [`record::CollisionMut`] and
/// [`record::SubProcessMut`].
pub use evrec_record as record;

/// Vertex-graph export (`evrec-export`).
///
/// [`export::GraphExporter`] converts an event into an
/// [`export::ExternalEvent`].
pub use evrec_export as export;

/// Common imports for typical evrec usage.
///
/// ```rust
/// use evrec::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use evrec_core::{
        CollisionId, ColourLineId, ColourRep, LifetimeModel, Lorentz5Momentum, LorentzPoint,
        NominalLifetime, ParticleData, ParticleId, SpeciesRef, StepId, SubProcessId,
    };

    // Arena
    pub use evrec_arena::ArenaConfig;

    // Record
    pub use evrec_record::{
        AllFinalState, AllParticles, Charged, Coloured, Event, EventConfig, FinalState,
        Intermediates, Particle, ParticleSelector, Select, TranslationMap,
    };

    // Errors
    pub use evrec_export::ExportError;
    pub use evrec_record::RecordError;

    // Export
    pub use evrec_export::{ExportConfig, ExternalEvent, GraphExporter};
}

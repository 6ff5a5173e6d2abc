//! Event record for evrec.
//!
//! An [`Event`] owns every particle, step, sub-process, collision and
//! colour line it contains, each in its own generational arena.
//! Cross-references are typed handles from [`evrec_core`]. Reads go
//! through the event's accessors; edits go through cursors borrowed from
//! it ([`StepMut`], [`CollisionMut`], [`SubProcessMut`]) or through the
//! relation and colour methods on [`Event`] itself, all of which keep
//! both ends of every link consistent.
//!
//! # Structure
//!
//! ```text
//! Event
//! ├── Collision[]        incoming pair, steps, sub-processes
//! │   └── Step[]         final state, intermediates, all particles
//! ├── SubProcess[]       incoming partons, intermediates, outgoing
//! ├── Particle[]         species, momentum, relations, extended state
//! └── ColourTable        colour lines + particle-to-line index
//! ```
//!
//! Deep copies use a copy-then-rebind protocol: see [`rebind`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod clone;
pub mod collision;
pub mod colour;
pub mod config;
pub mod error;
pub mod event;
pub mod particle;
pub mod rebind;
pub mod select;
pub mod step;
pub mod sub_process;

pub use collision::{Collision, CollisionMut};
pub use colour::{ColourLine, ColourTable};
pub use config::EventConfig;
pub use error::RecordError;
pub use event::{Event, SharedLifetimeModel};
pub use particle::{ExtendedState, ExtraInfo, Particle, SpinInfo};
pub use rebind::{Rebind, Translate, TranslationMap};
pub use select::{
    AllFinalState, AllParticles, Charged, Coloured, FinalState, Intermediates, ParticleSelector,
    Select,
};
pub use step::{Step, StepMut};
pub use sub_process::{SubProcess, SubProcessMut};

//! Error types for event-record mutation.
//!
//! Lookups that can legitimately miss (a stale handle, a particle with no
//! colour line) return `Option`. Operations that were asked to do
//! something structurally impossible return [`RecordError`] and leave the
//! record untouched.

use std::error::Error;
use std::fmt;

use evrec_arena::ArenaError;
use evrec_core::{CollisionId, ColourLineId, ParticleId, StepId, SubProcessId};

/// Errors from building or editing an [`Event`](crate::Event).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordError {
    /// The particle handle is stale or was never issued by this event.
    UnknownParticle {
        /// The offending handle.
        particle: ParticleId,
    },
    /// The step handle is stale or was never issued by this event.
    UnknownStep {
        /// The offending handle.
        step: StepId,
    },
    /// The sub-process handle is stale or was never issued by this event.
    UnknownSubProcess {
        /// The offending handle.
        sub_process: SubProcessId,
    },
    /// The collision handle is stale or was never issued by this event.
    UnknownCollision {
        /// The offending handle.
        collision: CollisionId,
    },
    /// The colour line handle is stale or was never issued by this event.
    UnknownColourLine {
        /// The offending handle.
        line: ColourLineId,
    },
    /// The particle is not part of the step the operation targets.
    NotInStep {
        /// The particle.
        particle: ParticleId,
        /// The step that was searched.
        step: StepId,
    },
    /// The operation is only allowed on the last step of a collision.
    NotFinalStep {
        /// The step that was targeted.
        step: StepId,
    },
    /// A decay was requested for a parent that is neither in the step nor
    /// has children there.
    ParentNotFound {
        /// The requested parent.
        parent: ParticleId,
        /// The step that was searched.
        step: StepId,
    },
    /// The particle already has a later instance and cannot be modified
    /// as if it were current.
    AlreadySuperseded {
        /// The superseded particle.
        particle: ParticleId,
    },
    /// The particle is one of its collision's incoming pair, which cannot
    /// be removed.
    ProtectedIncoming {
        /// The incoming particle.
        particle: ParticleId,
    },
    /// A colour line was requested on a side the species does not carry.
    Colourless {
        /// The particle.
        particle: ParticleId,
        /// `true` for the anti-colour side.
        anti: bool,
    },
    /// The event has no collision to operate on.
    NoCollision,
    /// A collision cannot be created without two incoming particles.
    MissingIncoming,
    /// Arena allocation failed.
    Arena(ArenaError),
    /// The event configuration violates an invariant.
    InvalidConfig {
        /// Which invariant was violated.
        reason: String,
    },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownParticle { particle } => write!(f, "unknown particle {particle}"),
            Self::UnknownStep { step } => write!(f, "unknown step {step}"),
            Self::UnknownSubProcess { sub_process } => {
                write!(f, "unknown sub-process {sub_process}")
            }
            Self::UnknownCollision { collision } => write!(f, "unknown collision {collision}"),
            Self::UnknownColourLine { line } => write!(f, "unknown colour line {line}"),
            Self::NotInStep { particle, step } => {
                write!(f, "particle {particle} is not in step {step}")
            }
            Self::NotFinalStep { step } => {
                write!(f, "step {step} is not the last step of its collision")
            }
            Self::ParentNotFound { parent, step } => {
                write!(f, "decay parent {parent} not found in step {step}")
            }
            Self::AlreadySuperseded { particle } => {
                write!(f, "particle {particle} already has a later instance")
            }
            Self::ProtectedIncoming { particle } => {
                write!(f, "particle {particle} is a collision incoming particle")
            }
            Self::Colourless { particle, anti } => {
                let side = if *anti { "anti-colour" } else { "colour" };
                write!(f, "particle {particle} carries no {side}")
            }
            Self::NoCollision => write!(f, "event has no collision"),
            Self::MissingIncoming => write!(f, "collision needs two incoming particles"),
            Self::Arena(e) => write!(f, "arena: {e}"),
            Self::InvalidConfig { reason } => write!(f, "invalid event config: {reason}"),
        }
    }
}

impl Error for RecordError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arena(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ArenaError> for RecordError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}

//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The arena is full: no vacant slot and the slot limit is reached.
    CapacityExceeded {
        /// Slots that would be needed.
        requested: usize,
        /// The configured slot limit.
        capacity: usize,
    },
    /// A handle whose slot has been vacated (and possibly reused) since
    /// the handle was issued.
    StaleHandle {
        /// Slot index encoded in the handle.
        slot: u32,
        /// Generation encoded in the handle.
        handle_generation: u32,
        /// Current generation of the slot, if the slot exists at all.
        current_generation: Option<u32>,
    },
    /// The arena configuration violates an invariant.
    InvalidConfig {
        /// Which invariant was violated.
        reason: String,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "arena capacity exceeded: requested {requested} slots, capacity {capacity}"
                )
            }
            Self::StaleHandle {
                slot,
                handle_generation,
                current_generation,
            } => match current_generation {
                Some(current) => write!(
                    f,
                    "stale handle: slot {slot} generation {handle_generation}, current {current}"
                ),
                None => write!(
                    f,
                    "stale handle: slot {slot} generation {handle_generation} was never allocated"
                ),
            },
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
        }
    }
}

impl Error for ArenaError {}

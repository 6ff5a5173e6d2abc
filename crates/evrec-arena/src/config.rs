//! Arena configuration parameters.

use crate::error::ArenaError;

/// Configuration for a slot arena.
///
/// Controls the initial allocation and the hard slot limit. Validated at
/// construction; all values are immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Number of slots reserved up front.
    ///
    /// Default: 64. Must not exceed `max_slots`.
    pub initial_capacity: u32,

    /// Maximum number of slots (live + vacant) the arena may hold.
    ///
    /// Default: `u32::MAX`. Must be at least 1.
    pub max_slots: u32,
}

impl ArenaConfig {
    /// Default initial capacity.
    pub const DEFAULT_INITIAL_CAPACITY: u32 = 64;

    /// Default slot limit.
    pub const DEFAULT_MAX_SLOTS: u32 = u32::MAX;

    /// Create a config with the given slot limit and default capacity
    /// (clamped to the limit).
    pub fn with_max_slots(max_slots: u32) -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY.min(max_slots),
            max_slots,
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.max_slots == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "max_slots must be at least 1".to_string(),
            });
        }
        if self.initial_capacity > self.max_slots {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "initial_capacity ({}) exceeds max_slots ({})",
                    self.initial_capacity, self.max_slots
                ),
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
            max_slots: Self::DEFAULT_MAX_SLOTS,
        }
    }
}

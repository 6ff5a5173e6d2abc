//! Event construction parameters.

use evrec_arena::ArenaConfig;

use crate::error::RecordError;

/// Configuration for a new [`Event`](crate::Event).
///
/// Validated by [`Event::new`](crate::Event::new); immutable afterwards
/// except through the event's own setters.
#[derive(Clone, Debug, PartialEq)]
pub struct EventConfig {
    /// Free-form event name, usually the generator run name.
    pub name: String,
    /// Event number within the run.
    pub number: i64,
    /// Nominal event weight. Must be finite.
    ///
    /// Default: 1.0.
    pub weight: f64,
    /// Sizing shared by every object arena the event owns.
    pub arena: ArenaConfig,
}

impl EventConfig {
    /// Config for a named, numbered event with default weight and sizing.
    pub fn named(name: impl Into<String>, number: i64) -> Self {
        Self {
            name: name.into(),
            number,
            ..Self::default()
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), RecordError> {
        if !self.weight.is_finite() {
            return Err(RecordError::InvalidConfig {
                reason: format!("weight must be finite, got {}", self.weight),
            });
        }
        self.arena.validate()?;
        Ok(())
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            number: 0,
            weight: 1.0,
            arena: ArenaConfig::default(),
        }
    }
}

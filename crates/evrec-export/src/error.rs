//! Error types for event export.
//!
//! Export never repairs a broken record. Any dangling reference aborts the
//! conversion and nothing partial is returned.

use std::error::Error;
use std::fmt;

use evrec_core::ParticleId;
use evrec_record::RecordError;

/// Errors from converting an [`Event`](evrec_record::Event).
#[derive(Clone, Debug, PartialEq)]
pub enum ExportError {
    /// A relation points at a particle outside the exported set.
    DanglingReference {
        /// The particle holding the reference.
        from: ParticleId,
        /// The particle it refers to.
        to: ParticleId,
    },
    /// A particle that must own a vertex has none.
    MissingVertex {
        /// The particle.
        particle: ParticleId,
    },
    /// The export configuration is invalid.
    InvalidConfig {
        /// What was wrong.
        reason: String,
    },
    /// The record rejected a lookup made during export.
    Record(RecordError),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingReference { from, to } => {
                write!(f, "particle {from} refers to {to}, which is not in the event")
            }
            Self::MissingVertex { particle } => {
                write!(f, "particle {particle} has no vertex")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid export config: {reason}"),
            Self::Record(e) => write!(f, "record error: {e}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Record(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RecordError> for ExportError {
    fn from(e: RecordError) -> Self {
        Self::Record(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_both_ends() {
        let e = ExportError::DanglingReference {
            from: ParticleId::from_raw(3, 0),
            to: ParticleId::from_raw(9, 2),
        };
        let s = e.to_string();
        assert!(s.contains("p3v0"), "{s}");
        assert!(s.contains("p9v2"), "{s}");
    }

    #[test]
    fn record_errors_are_chained() {
        let inner = RecordError::NoCollision;
        let e = ExportError::from(inner.clone());
        assert_eq!(e, ExportError::Record(inner));
        assert!(e.source().is_some());
        assert!(ExportError::MissingVertex {
            particle: ParticleId::from_raw(0, 0)
        }
        .source()
        .is_none());
    }
}

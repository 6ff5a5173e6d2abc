//! Export configuration.

use std::fmt;

use crate::error::ExportError;

/// Lowest colour-flow offset that keeps flow ids clear of reserved
/// status codes.
pub const MIN_COLOUR_FLOW_OFFSET: i32 = 100;

/// Energy unit of exported momenta. Records hold GeV.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EnergyUnit {
    /// Giga-electronvolt.
    #[default]
    GeV,
    /// Mega-electronvolt.
    MeV,
}

impl EnergyUnit {
    /// Multiplier from GeV.
    pub fn factor(self) -> f64 {
        match self {
            Self::GeV => 1.0,
            Self::MeV => 1000.0,
        }
    }
}

impl fmt::Display for EnergyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::GeV => "GEV",
            Self::MeV => "MEV",
        })
    }
}

/// Length unit of exported vertex positions. Records hold millimetres.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LengthUnit {
    /// Millimetre.
    #[default]
    Mm,
    /// Centimetre.
    Cm,
}

impl LengthUnit {
    /// Multiplier from millimetres.
    pub fn factor(self) -> f64 {
        match self {
            Self::Mm => 1.0,
            Self::Cm => 0.1,
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mm => "MM",
            Self::Cm => "CM",
        })
    }
}

/// Parameters for [`GraphExporter`](crate::GraphExporter).
#[derive(Clone, Debug, PartialEq)]
pub struct ExportConfig {
    /// Colour-flow ids start at `colour_flow_offset + 1`.
    ///
    /// Default: 500. Must be at least [`MIN_COLOUR_FLOW_OFFSET`].
    pub colour_flow_offset: i32,

    /// Unit for exported momenta.
    pub energy_unit: EnergyUnit,

    /// Unit for exported vertex positions.
    pub length_unit: LengthUnit,

    /// Register the primary sub-process vertex as the signal vertex,
    /// separate from the general vertex list.
    ///
    /// Default: `true`.
    pub include_signal_vertex: bool,
}

impl ExportConfig {
    /// Default colour-flow offset.
    pub const DEFAULT_COLOUR_FLOW_OFFSET: i32 = 500;

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.colour_flow_offset < MIN_COLOUR_FLOW_OFFSET {
            return Err(ExportError::InvalidConfig {
                reason: format!(
                    "colour_flow_offset ({}) collides with reserved ids below {}",
                    self.colour_flow_offset, MIN_COLOUR_FLOW_OFFSET
                ),
            });
        }
        if self.colour_flow_offset == i32::MAX {
            return Err(ExportError::InvalidConfig {
                reason: "colour_flow_offset leaves no room for flow ids".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            colour_flow_offset: Self::DEFAULT_COLOUR_FLOW_OFFSET,
            energy_unit: EnergyUnit::default(),
            length_unit: LengthUnit::default(),
            include_signal_vertex: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ExportConfig::default().validate().is_ok());
    }

    #[test]
    fn reserved_offsets_rejected() {
        let cfg = ExportConfig {
            colour_flow_offset: 99,
            ..ExportConfig::default()
        };
        match cfg.validate() {
            Err(ExportError::InvalidConfig { reason }) => assert!(reason.contains("99")),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
        let edge = ExportConfig {
            colour_flow_offset: MIN_COLOUR_FLOW_OFFSET,
            ..ExportConfig::default()
        };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn overflowing_offset_rejected() {
        let cfg = ExportConfig {
            colour_flow_offset: i32::MAX,
            ..ExportConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn unit_factors() {
        assert_eq!(EnergyUnit::MeV.factor(), 1000.0);
        assert_eq!(LengthUnit::Cm.factor(), 0.1);
        assert_eq!(EnergyUnit::default().to_string(), "GEV");
    }
}

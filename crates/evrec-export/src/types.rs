//! The exported vertex graph.
//!
//! An [`ExternalEvent`] is a read-only view: particles are edges, vertices
//! are interaction points, and vertices refer to particles by their index
//! in [`ExternalEvent::particles`].

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::config::{EnergyUnit, LengthUnit};

/// Status code of an exported particle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParticleStatus {
    /// No children and no later instance.
    Stable,
    /// Decayed, or superseded by a later instance.
    Decayed,
}

impl ParticleStatus {
    /// Numeric status code.
    pub fn code(self) -> i32 {
        match self {
            Self::Stable => 1,
            Self::Decayed => 2,
        }
    }
}

/// Flow index for the colour side in [`ExternalParticle::colour_flow`].
pub const COLOUR_INDEX: u8 = 1;

/// Flow index for the anti-colour side in [`ExternalParticle::colour_flow`].
pub const ANTI_COLOUR_INDEX: u8 = 2;

/// One exported particle.
#[derive(Clone, Debug, PartialEq)]
pub struct ExternalParticle {
    /// Event-local particle number.
    pub number: i64,
    /// PDG code.
    pub pdg_id: i64,
    /// `[px, py, pz, e]` in the event's energy unit.
    pub momentum: [f64; 4],
    /// Generated mass in the event's energy unit.
    pub generated_mass: f64,
    /// Decay status.
    pub status: ParticleStatus,
    /// `(index, id)` pairs; index [`COLOUR_INDEX`] or [`ANTI_COLOUR_INDEX`].
    pub colour_flow: SmallVec<[(u8, i32); 2]>,
    /// Polarization `(theta, phi)`, if set.
    pub polarization: Option<(f64, f64)>,
}

impl ExternalParticle {
    /// Flow id on one side, if any.
    pub fn flow(&self, index: u8) -> Option<i32> {
        self.colour_flow
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, id)| *id)
    }
}

/// One exported vertex.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExternalVertex {
    /// `[x, y, z, t]` in the event's length unit.
    pub position: [f64; 4],
    /// Indices of incoming particles.
    pub incoming: Vec<usize>,
    /// Indices of outgoing particles.
    pub outgoing: Vec<usize>,
}

impl ExternalVertex {
    /// Number of attached particles.
    pub fn degree(&self) -> usize {
        self.incoming.len() + self.outgoing.len()
    }
}

/// A converted event.
#[derive(Clone, Debug, PartialEq)]
pub struct ExternalEvent {
    /// Event number.
    pub event_number: i64,
    /// Nominal weight.
    pub weight: f64,
    /// Named alternative weights.
    pub optional_weights: IndexMap<String, f64>,
    /// Hard scale in the event's energy unit.
    pub scale: Option<f64>,
    /// Strong coupling.
    pub alpha_s: Option<f64>,
    /// Electromagnetic coupling.
    pub alpha_em: Option<f64>,
    /// Unit of momenta and masses.
    pub energy_unit: EnergyUnit,
    /// Unit of vertex positions.
    pub length_unit: LengthUnit,
    /// Every exported particle.
    pub particles: Vec<ExternalParticle>,
    /// The primary sub-process vertex, kept out of [`vertices`](Self::vertices).
    pub signal_vertex: Option<ExternalVertex>,
    /// Every other vertex.
    pub vertices: Vec<ExternalVertex>,
}

impl ExternalEvent {
    /// Number of vertices, signal vertex included.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() + usize::from(self.signal_vertex.is_some())
    }

    /// Number of particle-to-vertex attachments, signal vertex included.
    pub fn edge_count(&self) -> usize {
        self.all_vertices().map(ExternalVertex::degree).sum()
    }

    /// Signal vertex first, then the rest.
    pub fn all_vertices(&self) -> impl Iterator<Item = &ExternalVertex> + '_ {
        self.signal_vertex.iter().chain(self.vertices.iter())
    }

    /// Particle with the given event-local number.
    pub fn find_particle(&self, number: i64) -> Option<&ExternalParticle> {
        self.particles.iter().find(|p| p.number == number)
    }

    /// Index of the particle with the given event-local number.
    pub fn particle_index(&self, number: i64) -> Option<usize> {
        self.particles.iter().position(|p| p.number == number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(number: i64, flow: &[(u8, i32)]) -> ExternalParticle {
        ExternalParticle {
            number,
            pdg_id: 21,
            momentum: [0.0, 0.0, 1.0, 1.0],
            generated_mass: 0.0,
            status: ParticleStatus::Stable,
            colour_flow: flow.iter().copied().collect(),
            polarization: None,
        }
    }

    #[test]
    fn counts_include_signal_vertex() {
        let ev = ExternalEvent {
            event_number: 1,
            weight: 1.0,
            optional_weights: IndexMap::new(),
            scale: None,
            alpha_s: None,
            alpha_em: None,
            energy_unit: EnergyUnit::GeV,
            length_unit: LengthUnit::Mm,
            particles: vec![particle(1, &[]), particle(2, &[(1, 501), (2, 502)])],
            signal_vertex: Some(ExternalVertex {
                position: [0.0; 4],
                incoming: vec![0],
                outgoing: vec![1],
            }),
            vertices: vec![ExternalVertex {
                position: [0.0; 4],
                incoming: vec![1],
                outgoing: vec![],
            }],
        };
        assert_eq!(ev.vertex_count(), 2);
        assert_eq!(ev.edge_count(), 3);
        assert_eq!(ev.find_particle(2).and_then(|p| p.flow(ANTI_COLOUR_INDEX)), Some(502));
        assert_eq!(ev.particle_index(2), Some(1));
        assert!(ev.find_particle(7).is_none());
    }

    #[test]
    fn status_codes() {
        assert_eq!(ParticleStatus::Stable.code(), 1);
        assert_eq!(ParticleStatus::Decayed.code(), 2);
    }
}

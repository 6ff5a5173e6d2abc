//! Core abstraction traits for arena addressing and lifetime modelling.

use crate::species::ParticleData;

/// A typed key addressing a slot in a generational arena.
///
/// Implemented by the handle types in [`crate::id`]. The arena stores the
/// current generation of every slot and bumps it on removal, so a key whose
/// generation no longer matches is stale.
pub trait ArenaKey: Copy + Eq + std::hash::Hash {
    /// Build a key from a slot index and generation.
    fn new(slot: u32, generation: u32) -> Self;

    /// The slot index this key addresses.
    fn slot(&self) -> u32;

    /// The slot generation this key was issued for.
    fn generation(&self) -> u32;
}

/// Supplies proper decay lengths for unstable species.
///
/// The event record never samples lifetimes itself. When a particle's
/// extended state is materialized, its life-length four-vector is computed
/// as `p * (c·tau / m)` using the value returned here. Implementations may
/// be deterministic (see [`NominalLifetime`]) or wrap a seeded generator
/// owned by the caller.
pub trait LifetimeModel {
    /// Proper decay length `c·tau` in millimetres for a particle of the
    /// given species and (possibly off-shell) mass.
    fn proper_lifetime(&self, species: &ParticleData, mass: f64) -> f64;
}

/// Deterministic lifetime model using the species' nominal values.
///
/// Returns `ctau` when the species declares one, otherwise derives it from
/// the total width as `hbar*c / width`. Stable species and zero-width
/// species get zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NominalLifetime;

impl NominalLifetime {
    /// `hbar * c` in GeV·mm.
    pub const HBARC: f64 = 1.973_269_804e-13;
}

impl LifetimeModel for NominalLifetime {
    fn proper_lifetime(&self, species: &ParticleData, _mass: f64) -> f64 {
        if species.stable {
            return 0.0;
        }
        if species.ctau > 0.0 {
            return species.ctau;
        }
        if species.width > 0.0 {
            return Self::HBARC / species.width;
        }
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::ColourRep;

    fn species(width: f64, ctau: f64, stable: bool) -> ParticleData {
        ParticleData {
            pdg_id: 999,
            name: "test".into(),
            mass: 1.0,
            width,
            ctau,
            charge3: 0,
            colour: ColourRep::Singlet,
            stable,
        }
    }

    #[test]
    fn explicit_ctau_wins() {
        let pd = species(1.0, 0.5, false);
        assert_eq!(NominalLifetime.proper_lifetime(&pd, 1.0), 0.5);
    }

    #[test]
    fn width_converted_with_hbarc() {
        let pd = species(2.0, 0.0, false);
        let ctau = NominalLifetime.proper_lifetime(&pd, 1.0);
        assert!((ctau - NominalLifetime::HBARC / 2.0).abs() < 1e-25);
    }

    #[test]
    fn stable_species_never_decay() {
        let pd = species(1.0, 3.0, true);
        assert_eq!(NominalLifetime.proper_lifetime(&pd, 1.0), 0.0);
    }
}

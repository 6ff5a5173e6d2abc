//! Standard Model species used across the test suites.
//!
//! Masses in GeV, widths in GeV, charges in units of e/3.

use evrec_core::{ColourRep, ParticleData, SpeciesRef};

pub fn proton() -> SpeciesRef {
    ParticleData::new(2212, "p+", 0.938_272, 3).shared()
}

pub fn electron() -> SpeciesRef {
    ParticleData::new(11, "e-", 0.000_511, -3).shared()
}

pub fn positron() -> SpeciesRef {
    ParticleData::new(-11, "e+", 0.000_511, 3).shared()
}

pub fn photon() -> SpeciesRef {
    ParticleData::new(22, "gamma", 0.0, 0).shared()
}

pub fn up() -> SpeciesRef {
    ParticleData::new(2, "u", 0.0022, 2)
        .with_colour(ColourRep::Triplet)
        .shared()
}

pub fn anti_up() -> SpeciesRef {
    ParticleData::new(-2, "ubar", 0.0022, -2)
        .with_colour(ColourRep::AntiTriplet)
        .shared()
}

pub fn down() -> SpeciesRef {
    ParticleData::new(1, "d", 0.0047, -1)
        .with_colour(ColourRep::Triplet)
        .shared()
}

pub fn anti_down() -> SpeciesRef {
    ParticleData::new(-1, "dbar", 0.0047, 1)
        .with_colour(ColourRep::AntiTriplet)
        .shared()
}

pub fn bottom() -> SpeciesRef {
    ParticleData::new(5, "b", 4.18, -1)
        .with_colour(ColourRep::Triplet)
        .shared()
}

pub fn gluon() -> SpeciesRef {
    ParticleData::new(21, "g", 0.0, 0)
        .with_colour(ColourRep::Octet)
        .shared()
}

pub fn top() -> SpeciesRef {
    ParticleData::new(6, "t", 172.5, 2)
        .with_colour(ColourRep::Triplet)
        .with_width(1.42)
        .shared()
}

pub fn anti_top() -> SpeciesRef {
    ParticleData::new(-6, "tbar", 172.5, -2)
        .with_colour(ColourRep::AntiTriplet)
        .with_width(1.42)
        .shared()
}

pub fn w_plus() -> SpeciesRef {
    ParticleData::new(24, "W+", 80.37, 3).with_width(2.085).shared()
}

pub fn z_boson() -> SpeciesRef {
    ParticleData::new(23, "Z0", 91.1876, 0).with_width(2.4952).shared()
}

pub fn diquark() -> SpeciesRef {
    ParticleData::new(2203, "uu_1", 0.771_33, 4)
        .with_colour(ColourRep::AntiTriplet)
        .shared()
}

pub fn pion_plus() -> SpeciesRef {
    ParticleData::new(211, "pi+", 0.139_57, 3)
        .with_ctau(7804.5)
        .shared()
}

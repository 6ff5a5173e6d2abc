//! Particle species descriptions.
//!
//! A [`ParticleData`] is immutable once built and shared by every particle
//! instance of that species through a [`SpeciesRef`].

use std::fmt;
use std::sync::Arc;

/// Shared, immutable reference to a species description.
pub type SpeciesRef = Arc<ParticleData>;

/// SU(3) colour representation of a species.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColourRep {
    /// Colour neutral.
    Singlet,
    /// Carries colour only (quarks).
    Triplet,
    /// Carries anti-colour only (anti-quarks).
    AntiTriplet,
    /// Carries both colour and anti-colour (gluons).
    Octet,
}

impl ColourRep {
    /// Whether a particle in this representation carries colour.
    pub fn has_colour(self) -> bool {
        matches!(self, Self::Triplet | Self::Octet)
    }

    /// Whether a particle in this representation carries anti-colour.
    pub fn has_anti_colour(self) -> bool {
        matches!(self, Self::AntiTriplet | Self::Octet)
    }

    /// Whether the requested side (colour or anti-colour) is carried.
    pub fn has_side(self, anti: bool) -> bool {
        if anti {
            self.has_anti_colour()
        } else {
            self.has_colour()
        }
    }

    /// The conjugate representation.
    pub fn conjugate(self) -> Self {
        match self {
            Self::Triplet => Self::AntiTriplet,
            Self::AntiTriplet => Self::Triplet,
            other => other,
        }
    }
}

/// Static properties of a particle species.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleData {
    /// PDG Monte Carlo numbering scheme id.
    pub pdg_id: i64,
    /// Human-readable name, e.g. `"u"` or `"pi+"`.
    pub name: String,
    /// Nominal mass in GeV.
    pub mass: f64,
    /// Total width in GeV.
    pub width: f64,
    /// Nominal proper decay length in mm. Zero means "derive from width".
    pub ctau: f64,
    /// Electric charge in units of e/3.
    pub charge3: i32,
    /// Colour representation.
    pub colour: ColourRep,
    /// Stable species never get a non-zero life-length.
    pub stable: bool,
}

impl ParticleData {
    /// Build a stable colour-singlet species.
    pub fn new(pdg_id: i64, name: impl Into<String>, mass: f64, charge3: i32) -> Self {
        Self {
            pdg_id,
            name: name.into(),
            mass,
            width: 0.0,
            ctau: 0.0,
            charge3,
            colour: ColourRep::Singlet,
            stable: true,
        }
    }

    /// Set the colour representation.
    pub fn with_colour(mut self, colour: ColourRep) -> Self {
        self.colour = colour;
        self
    }

    /// Mark the species unstable with the given width.
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self.stable = false;
        self
    }

    /// Mark the species unstable with the given proper decay length.
    pub fn with_ctau(mut self, ctau: f64) -> Self {
        self.ctau = ctau;
        self.stable = false;
        self
    }

    /// Wrap in a shared reference.
    pub fn shared(self) -> SpeciesRef {
        Arc::new(self)
    }

    /// Whether the species is electrically charged.
    pub fn charged(&self) -> bool {
        self.charge3 != 0
    }

    /// Electric charge in units of e.
    pub fn charge(&self) -> f64 {
        f64::from(self.charge3) / 3.0
    }

    /// Whether the species carries colour or anti-colour.
    pub fn coloured(&self) -> bool {
        self.colour != ColourRep::Singlet
    }

    /// Describe the charge-conjugate species.
    ///
    /// Self-conjugate species (neutral, singlet or octet, with a positive
    /// id that has no antiparticle) keep their id; everything else gets the
    /// negated id and a `bar`/sign-flipped name.
    pub fn cc(&self) -> Self {
        let self_conjugate = self.charge3 == 0
            && matches!(self.colour, ColourRep::Singlet | ColourRep::Octet)
            && is_self_conjugate_id(self.pdg_id);
        let mut out = self.clone();
        if self_conjugate {
            return out;
        }
        out.pdg_id = -self.pdg_id;
        out.charge3 = -self.charge3;
        out.colour = self.colour.conjugate();
        out.name = conjugate_name(&self.name);
        out
    }
}

impl fmt::Display for ParticleData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.pdg_id)
    }
}

/// Gauge bosons, the Higgs and neutral flavourless mesons are their own
/// antiparticles.
fn is_self_conjugate_id(pdg_id: i64) -> bool {
    let a = pdg_id.abs();
    match a {
        21..=23 | 25 => true,
        _ if a >= 100 => {
            let q2 = (a / 100) % 10;
            let q3 = (a / 10) % 10;
            a < 1000 && q2 == q3
        }
        _ => false,
    }
}

fn conjugate_name(name: &str) -> String {
    if let Some(stripped) = name.strip_suffix("bar") {
        return stripped.to_string();
    }
    if let Some(stripped) = name.strip_suffix('+') {
        return format!("{stripped}-");
    }
    if let Some(stripped) = name.strip_suffix('-') {
        return format!("{stripped}+");
    }
    format!("{name}bar")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quark_conjugates_to_antiquark() {
        let u = ParticleData::new(2, "u", 0.33, 2).with_colour(ColourRep::Triplet);
        let ubar = u.cc();
        assert_eq!(ubar.pdg_id, -2);
        assert_eq!(ubar.name, "ubar");
        assert_eq!(ubar.charge3, -2);
        assert_eq!(ubar.colour, ColourRep::AntiTriplet);
        assert_eq!(ubar.cc().name, "u");
    }

    #[test]
    fn gluon_is_self_conjugate() {
        let g = ParticleData::new(21, "g", 0.0, 0).with_colour(ColourRep::Octet);
        assert_eq!(g.cc(), g);
    }

    #[test]
    fn pi0_is_self_conjugate_pi_plus_is_not() {
        let pi0 = ParticleData::new(111, "pi0", 0.135, 0);
        assert_eq!(pi0.cc().pdg_id, 111);
        let pip = ParticleData::new(211, "pi+", 0.1396, 3);
        let pim = pip.cc();
        assert_eq!(pim.pdg_id, -211);
        assert_eq!(pim.name, "pi-");
    }

    #[test]
    fn colour_sides() {
        assert!(ColourRep::Octet.has_side(false));
        assert!(ColourRep::Octet.has_side(true));
        assert!(ColourRep::Triplet.has_side(false));
        assert!(!ColourRep::Triplet.has_side(true));
        assert!(!ColourRep::Singlet.has_colour());
    }

    #[test]
    fn builders_mark_unstable() {
        let z = ParticleData::new(23, "Z0", 91.19, 0).with_width(2.49);
        assert!(!z.stable);
        assert_eq!(z.width, 2.49);
        assert!(!z.charged());
        assert!((ParticleData::new(1, "d", 0.3, -1).charge() + 1.0 / 3.0).abs() < 1e-12);
    }
}

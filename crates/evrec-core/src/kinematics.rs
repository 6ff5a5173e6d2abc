//! Four-vector kinematics.
//!
//! Energies and momenta are in GeV, lengths and times in mm (c = 1).

use std::ops::{Add, AddAssign, Neg, Sub};

/// A four-momentum carrying an explicit (possibly off-shell) mass.
///
/// The fifth component lets a particle keep its generated mass even when
/// rounding or boosts leave `e² - p²` slightly inconsistent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Lorentz5Momentum {
    /// x component of the three-momentum.
    pub px: f64,
    /// y component of the three-momentum.
    pub py: f64,
    /// z component of the three-momentum.
    pub pz: f64,
    /// Energy.
    pub e: f64,
    /// Generated mass.
    pub mass: f64,
}

impl Lorentz5Momentum {
    /// Build from all five components.
    pub const fn new(px: f64, py: f64, pz: f64, e: f64, mass: f64) -> Self {
        Self {
            px,
            py,
            pz,
            e,
            mass,
        }
    }

    /// Build an on-shell momentum from a three-momentum and a mass.
    pub fn from_mass(px: f64, py: f64, pz: f64, mass: f64) -> Self {
        let e = (px * px + py * py + pz * pz + mass * mass).sqrt();
        Self::new(px, py, pz, e, mass)
    }

    /// A particle of the given mass at rest.
    pub fn at_rest(mass: f64) -> Self {
        Self::new(0.0, 0.0, 0.0, mass, mass)
    }

    /// Invariant mass squared from the four-vector components.
    pub fn mass2(&self) -> f64 {
        self.e * self.e - self.p2()
    }

    /// Invariant mass from the four-vector components (negative for
    /// space-like vectors).
    pub fn m(&self) -> f64 {
        let m2 = self.mass2();
        if m2 < 0.0 {
            -(-m2).sqrt()
        } else {
            m2.sqrt()
        }
    }

    /// Three-momentum magnitude squared.
    pub fn p2(&self) -> f64 {
        self.px * self.px + self.py * self.py + self.pz * self.pz
    }

    /// Transverse momentum.
    pub fn pt(&self) -> f64 {
        (self.px * self.px + self.py * self.py).sqrt()
    }

    /// Rapidity `0.5 ln((E+pz)/(E-pz))`; zero when undefined.
    pub fn rapidity(&self) -> f64 {
        let num = self.e + self.pz;
        let den = self.e - self.pz;
        if num <= 0.0 || den <= 0.0 {
            return 0.0;
        }
        0.5 * (num / den).ln()
    }

    /// The velocity vector `p/E`, or zero for a vanishing energy.
    pub fn boost_vector(&self) -> [f64; 3] {
        if self.e == 0.0 {
            return [0.0; 3];
        }
        [self.px / self.e, self.py / self.e, self.pz / self.e]
    }

    /// Reset the mass component to the invariant mass of the four-vector.
    pub fn rescale_mass(&mut self) {
        self.mass = self.m();
    }

    /// Scale all four-vector components by `factor` (the mass component
    /// scales with its absolute value).
    pub fn scale(&self, factor: f64) -> Self {
        Self::new(
            self.px * factor,
            self.py * factor,
            self.pz * factor,
            self.e * factor,
            self.mass * factor.abs(),
        )
    }

    /// The four-vector part as `[px, py, pz, e]`.
    pub fn to_array(&self) -> [f64; 4] {
        [self.px, self.py, self.pz, self.e]
    }
}

impl Add for Lorentz5Momentum {
    type Output = Self;

    /// Components add; the mass of the sum is the invariant mass.
    fn add(self, rhs: Self) -> Self {
        let mut out = Self::new(
            self.px + rhs.px,
            self.py + rhs.py,
            self.pz + rhs.pz,
            self.e + rhs.e,
            0.0,
        );
        out.rescale_mass();
        out
    }
}

impl AddAssign for Lorentz5Momentum {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Lorentz5Momentum {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl Neg for Lorentz5Momentum {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.px, -self.py, -self.pz, -self.e, self.mass)
    }
}

/// A space-time point or displacement.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LorentzPoint {
    /// x coordinate.
    pub x: f64,
    /// y coordinate.
    pub y: f64,
    /// z coordinate.
    pub z: f64,
    /// Time coordinate.
    pub t: f64,
}

impl LorentzPoint {
    /// Build from components.
    pub const fn new(x: f64, y: f64, z: f64, t: f64) -> Self {
        Self { x, y, z, t }
    }

    /// The origin.
    pub const fn origin() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Scale every component.
    pub fn scale(&self, factor: f64) -> Self {
        Self::new(
            self.x * factor,
            self.y * factor,
            self.z * factor,
            self.t * factor,
        )
    }

    /// Displacement along a momentum: `p * (ctau / m)`.
    ///
    /// Returns the origin for massless or zero-lifetime particles.
    pub fn along(momentum: &Lorentz5Momentum, ctau: f64) -> Self {
        if momentum.mass <= 0.0 || ctau <= 0.0 {
            return Self::origin();
        }
        let f = ctau / momentum.mass;
        Self::new(momentum.px * f, momentum.py * f, momentum.pz * f, momentum.e * f)
    }

    /// Components as `[x, y, z, t]`.
    pub fn to_array(&self) -> [f64; 4] {
        [self.x, self.y, self.z, self.t]
    }
}

impl Add for LorentzPoint {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.x + rhs.x,
            self.y + rhs.y,
            self.z + rhs.z,
            self.t + rhs.t,
        )
    }
}

impl AddAssign for LorentzPoint {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for LorentzPoint {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.x - rhs.x,
            self.y - rhs.y,
            self.z - rhs.z,
            self.t - rhs.t,
        )
    }
}
